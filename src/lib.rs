//! # Floodgate
//!
//! > *"Nothing gets through unchecked"*
//!
//! Declarative validation of field maps: attach rule expressions to fields,
//! run them against the input and collect every failure in one error bag.
//!
//! ## Concepts
//!
//! - **Rule expressions** name a rule and its options, e.g. `"required"` or
//!   `"between:3,10"`. The built-in rules are listed in [`builtin`].
//! - **Custom rules** are closures or types implementing [`Rule`], registered
//!   on a [`Validation`] under a name, or attached to a field inline.
//! - **Conditions** are the ordered rule chain of one field.
//! - **Error bags** map each failing field to its messages, in field order.
//!
//! ## Quick Example
//!
//! ```rust
//! use floodgate::{Outcome, RuleHandler, Validation};
//! use floodgate::testing::fields;
//! use serde_json::json;
//!
//! let mut validation = Validation::new();
//! validation
//!     .rule("crispy", RuleHandler::callback(|fields, key, _| {
//!         Outcome::check(fields.get(key) == Some(&json!("bacon")), "Only bacon is crispy")
//!     }))
//!     .condition("username", ["required", "alphanum", "between:3,16"])
//!     .unwrap()
//!     .condition("email", ["required", "email"])
//!     .unwrap()
//!     .condition("snack", "crispy")
//!     .unwrap();
//!
//! let input = fields(json!({
//!     "username": "x",
//!     "email": "not-an-email",
//!     "snack": "lettuce"
//! }));
//!
//! match validation.validate(&input, false) {
//!     Ok(()) => println!("Looks good"),
//!     Err(err) => {
//!         let bag = err.errors().unwrap();
//!         assert_eq!(bag.first("username"), Some("validation.between"));
//!         assert_eq!(bag.first("email"), Some("validation.email"));
//!         assert_eq!(bag.first("snack"), Some("Only bacon is crispy"));
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `trace`/`debug` events for failing rules, checked fields
//!   and finished runs.
//! - `serde`: `Serialize` for [`ErrorBag`].
//! - `proptest`: input strategies in [`testing`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod bag;
pub mod builtin;
pub mod condition;
mod config;
pub mod error;
pub mod expression;
pub mod registry;
pub mod rule;
pub mod semigroup;
pub mod testing;
pub mod validation;
pub mod value;

// Re-exports
pub use bag::ErrorBag;
pub use condition::{Condition, FieldReport};
pub use error::{Error, Result};
pub use expression::{RuleDescriptor, RuleKind, RuleToken};
pub use registry::{Registry, Resolved, RuleHandler};
pub use rule::{rule_fn, Outcome, Rule, RuleFn, RuleType};
pub use semigroup::Semigroup;
pub use validation::Validation;
pub use value::Fields;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bag::ErrorBag;
    pub use crate::error::{Error, Result};
    pub use crate::registry::RuleHandler;
    pub use crate::rule::{rule_fn, Outcome, Rule, RuleType};
    pub use crate::semigroup::Semigroup;
    pub use crate::validation::Validation;
    pub use crate::value::Fields;
}
