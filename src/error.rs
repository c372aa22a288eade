//! Error types for rule configuration and validation runs
//!
//! Every fallible operation in the crate returns [`Result`], whose error is the
//! single [`Error`] enum. The variants fall into two groups:
//!
//! - **Configuration errors** (`InvalidExpression`, `InvalidRuleType`,
//!   `InvalidHandlerType`, `MustImplementRuleInterface`, `UnknownRule`) signal a
//!   programming mistake in how rules were set up. They are returned as soon as
//!   they are detected and never end up in an error bag.
//! - **`ValidationFailed`** is the expected outcome of validating bad input. It
//!   carries the [`ErrorBag`] with the messages for every failing field.
//!
//! # Examples
//!
//! ```
//! use floodgate::{Error, Validation};
//! use floodgate::testing::fields;
//! use serde_json::json;
//!
//! let mut validation = Validation::new();
//! validation.condition("name", "required").unwrap();
//!
//! match validation.validate(&fields(json!({})), false) {
//!     Err(Error::ValidationFailed(bag)) => {
//!         assert_eq!(bag.get("name"), Some(&["validation.required".to_string()][..]));
//!     }
//!     other => panic!("Expected validation failure, got {:?}", other),
//! }
//! ```

use crate::bag::ErrorBag;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while configuring rules or validating input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A rule expression does not have the `name[:options]` shape.
    #[error("invalid rule expression specified: {0:?}")]
    InvalidExpression(String),

    /// A rule token is not an expression, a callback, a rule type or a sequence of those.
    ///
    /// Carries the kind of value that was supplied instead.
    #[error("invalid rule type specified: {0}")]
    InvalidRuleType(String),

    /// A custom rule handler is neither a callback nor a rule type.
    #[error("invalid handler specified for rule {0:?}: expected a callback or a rule type")]
    InvalidHandlerType(String),

    /// A resolved type does not provide the [`Rule`](crate::Rule) capability.
    ///
    /// Typed handles created through [`RuleType`](crate::RuleType) carry a
    /// `Rule` bound, so this only surfaces from bridges that build handles
    /// from untyped plugin tables.
    #[error("{0} must implement the Rule trait")]
    MustImplementRuleInterface(String),

    /// No resolution strategy matched a named rule.
    #[error("unknown rule type: {0:?}")]
    UnknownRule(String),

    /// At least one field did not pass its condition.
    #[error("validation not passed ({} failing field(s))", .0.len())]
    ValidationFailed(ErrorBag),
}

impl Error {
    /// Returns true for the [`Error::ValidationFailed`] variant.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Error::ValidationFailed(_))
    }

    /// Returns true for the configuration variants.
    pub fn is_configuration(&self) -> bool {
        !self.is_validation_failure()
    }

    /// The error bag carried by a validation failure.
    pub fn errors(&self) -> Option<&ErrorBag> {
        match self {
            Error::ValidationFailed(bag) => Some(bag),
            _ => None,
        }
    }

    /// Consume the error, returning the bag of a validation failure.
    pub fn into_errors(self) -> Option<ErrorBag> {
        match self {
            Error::ValidationFailed(bag) => Some(bag),
            _ => None,
        }
    }
}
