//! The rule capability and handles to custom rules
//!
//! A rule looks at the input fields, the key of the field under validation and
//! the options parsed from its expression, and returns an [`Outcome`].
//!
//! Custom rules come in two shapes:
//!
//! - **Callbacks**: any closure `Fn(&Fields, &str, &[String]) -> Outcome`,
//!   wrapped with [`rule_fn`].
//! - **Rule types**: a type implementing [`Rule`], referenced through a
//!   [`RuleType`] handle that builds a fresh instance for every check.
//!
//! # Example
//!
//! ```rust
//! use floodgate::{Fields, Outcome, Rule};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Website;
//!
//! impl Rule for Website {
//!     fn check(&self, fields: &Fields, key: &str, _options: &[String]) -> Outcome {
//!         match fields.get(key).and_then(|v| v.as_str()) {
//!             Some(url) if url.starts_with("http://") || url.starts_with("https://") => Outcome::Pass,
//!             _ => Outcome::fail("Invalid Website specified"),
//!         }
//!     }
//! }
//!
//! let mut fields = Fields::new();
//! fields.insert("site".into(), json!("https://example.com"));
//! assert!(Website.check(&fields, "site", &[]).is_pass());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::value::Fields;

/// Result of evaluating one rule against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value satisfies the rule.
    Pass,
    /// The value violates the rule, with an optional message.
    ///
    /// Without a message the condition records a default one for the rule.
    Fail(Option<String>),
}

impl Outcome {
    /// A failure carrying a message.
    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail(Some(message.into()))
    }

    /// `Pass` when `valid`, otherwise a failure with `message`.
    pub fn check(valid: bool, message: impl Into<String>) -> Self {
        if valid {
            Outcome::Pass
        } else {
            Outcome::fail(message)
        }
    }

    /// Whether the rule passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// Whether the rule failed.
    pub fn is_fail(&self) -> bool {
        !self.is_pass()
    }
}

/// The rule capability.
///
/// Implemented for every closure of the matching shape, so plain functions and
/// closures work wherever a rule is expected.
pub trait Rule: Send + Sync {
    /// Evaluate the rule for `fields[key]`.
    fn check(&self, fields: &Fields, key: &str, options: &[String]) -> Outcome;
}

impl<F> Rule for F
where
    F: Fn(&Fields, &str, &[String]) -> Outcome + Send + Sync,
{
    #[inline]
    fn check(&self, fields: &Fields, key: &str, options: &[String]) -> Outcome {
        self(fields, key, options)
    }
}

/// Shared handle to a callback rule.
pub type RuleFn = Arc<dyn Rule>;

/// Wrap a closure as a callback rule.
///
/// Taking the closure through this function pins down its argument types, so
/// callers do not have to annotate them.
///
/// ```rust
/// use floodgate::{rule_fn, Outcome};
///
/// let even = rule_fn(|fields, key, _| {
///     let n = fields.get(key).and_then(|v| v.as_i64()).unwrap_or(1);
///     Outcome::check(n % 2 == 0, "must be even")
/// });
/// # let _ = even;
/// ```
pub fn rule_fn<F>(f: F) -> RuleFn
where
    F: Fn(&Fields, &str, &[String]) -> Outcome + Send + Sync + 'static,
{
    Arc::new(f)
}

type Factory = Arc<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// A constructible rule type, addressed by its type path.
///
/// The handle stores a constructor instead of an instance; each check builds a
/// fresh rule, so rule types may keep per-check state.
#[derive(Clone)]
pub struct RuleType {
    name: String,
    factory: Factory,
}

impl RuleType {
    /// Handle for a `Default` rule type, named after its Rust type path.
    pub fn of<T>() -> Self
    where
        T: Rule + Default + 'static,
    {
        Self::new(std::any::type_name::<T>(), || Box::new(T::default()))
    }

    /// Handle with an explicit name and constructor.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Rule> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// The type path this handle answers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh rule instance.
    pub fn instantiate(&self) -> Box<dyn Rule> {
        (self.factory)()
    }
}

impl fmt::Debug for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleType").field(&self.name).finish()
    }
}

impl PartialEq for RuleType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
