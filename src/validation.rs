//! Field validation over a map of input values
//!
//! A [`Validation`] maps field names to [`Condition`]s and owns the
//! [`Registry`] of custom rules those conditions may reference. Running it
//! checks every field in the order its condition was first created and
//! collects the failures into an [`ErrorBag`].
//!
//! A run does not stop at the first failing field unless `bail` is requested:
//! every failure is gathered and combined with [`Semigroup::combine`].
//!
//! # Example
//!
//! ```rust
//! use floodgate::{Outcome, RuleHandler, Validation};
//! use floodgate::testing::fields;
//! use serde_json::json;
//!
//! let mut validation = Validation::new();
//! validation
//!     .rule("even", RuleHandler::callback(|fields, key, _| {
//!         let even = fields.get(key).and_then(|v| v.as_i64()).is_some_and(|n| n % 2 == 0);
//!         Outcome::check(even, "must be even")
//!     }))
//!     .condition("name", ["required", "alpha"])
//!     .unwrap()
//!     .condition("count", "even")
//!     .unwrap();
//!
//! assert!(validation.validate(&fields(json!({"name": "Bob", "count": 4})), false).is_ok());
//!
//! let err = validation
//!     .validate(&fields(json!({"name": "B0b", "count": 3})), false)
//!     .unwrap_err();
//! let bag = err.errors().unwrap();
//! assert_eq!(bag.fields().collect::<Vec<_>>(), ["name", "count"]);
//! assert_eq!(bag.first("count"), Some("must be even"));
//! ```

use crate::bag::ErrorBag;
use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::expression::RuleToken;
use crate::registry::{Registry, RuleHandler};
use crate::rule::RuleType;
use crate::semigroup::Semigroup;
use crate::value::Fields;

/// Conditions per field, plus the custom rules they may use.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    conditions: Vec<(String, Condition)>,
    // (field, rule, message) for fields that have no condition yet
    pending_messages: Vec<(String, String, String)>,
    registry: Registry,
}

impl Validation {
    /// Create a validation with no conditions and no custom rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach rules to `field`, creating its condition on first use.
    ///
    /// Fields are checked in the order their conditions were created, no
    /// matter how often rules are added later.
    pub fn condition(&mut self, field: impl Into<String>, rules: impl Into<RuleToken>) -> Result<&mut Self> {
        self.condition_mut(field.into()).rule(rules)?;
        Ok(self)
    }

    /// Register (or replace) a custom rule under `name`.
    pub fn rule(&mut self, name: impl Into<String>, handler: impl Into<RuleHandler>) -> &mut Self {
        self.registry.register(name, handler);
        self
    }

    /// Make a rule type addressable by its type path.
    pub fn register_type(&mut self, handle: RuleType) -> &mut Self {
        self.registry.register_type(handle);
        self
    }

    /// Override the message recorded when `rule` fails on `field`.
    ///
    /// A field without rules keeps the message until its condition is
    /// created; it is not checked and keeps no place in the field order.
    pub fn message(
        &mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        let (field, rule, message) = (field.into(), rule.into(), message.into());
        if let Some((_, condition)) = self.conditions.iter_mut().find(|(key, _)| *key == field) {
            condition.message(rule, message);
            return self;
        }

        match self
            .pending_messages
            .iter_mut()
            .find(|(key, name, _)| *key == field && *name == rule)
        {
            Some((_, _, existing)) => *existing = message,
            None => self.pending_messages.push((field, rule, message)),
        }
        self
    }

    /// Check `fields` against every condition.
    ///
    /// Returns `Ok(())` when every field passes and
    /// [`Error::ValidationFailed`] with the collected messages otherwise. With
    /// `bail`, each field stops at its first failing rule and the run stops at
    /// the first failing field.
    ///
    /// Configuration errors (an unknown rule name, for instance) abort the run
    /// and are returned instead of a bag.
    pub fn validate(&self, fields: &Fields, bail: bool) -> Result<()> {
        let errors = self.errors(fields, bail)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(errors))
        }
    }

    /// Check `fields` and return the collected failures without turning them
    /// into an error. An empty bag means the input passed.
    pub fn errors(&self, fields: &Fields, bail: bool) -> Result<ErrorBag> {
        let mut errors = ErrorBag::new();

        for (key, condition) in &self.conditions {
            let report = condition.check(fields, key, bail, &self.registry)?;
            if report.passed() {
                continue;
            }
            errors = errors.combine(report.errors());
            if bail {
                break;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            conditions = self.conditions.len(),
            failed = errors.len(),
            bail,
            "validation finished"
        );

        Ok(errors)
    }

    /// Whether `fields` passes every condition.
    ///
    /// Configuration errors count as not passing.
    pub fn passes(&self, fields: &Fields) -> bool {
        matches!(self.errors(fields, true), Ok(errors) if errors.is_empty())
    }

    /// Conditions in field order.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions
            .iter()
            .map(|(field, condition)| (field.as_str(), condition))
    }

    /// The condition attached to `field`.
    pub fn get_condition(&self, field: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, condition)| condition)
    }

    /// Registered custom rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &RuleHandler)> {
        self.registry.rules()
    }

    /// Whether a custom rule is registered under `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.registry.has_rule(name)
    }

    /// The custom rule registered under `name`.
    pub fn get_rule(&self, name: &str) -> Result<&RuleHandler> {
        self.registry.get_rule(name)
    }

    /// The registry backing this validation.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn condition_mut(&mut self, field: String) -> &mut Condition {
        let index = match self.conditions.iter().position(|(key, _)| *key == field) {
            Some(index) => index,
            None => {
                let mut condition = Condition::new();
                for (_, rule, message) in self.pending_messages.extract_if(.., |(key, _, _)| *key == field) {
                    condition.message(rule, message);
                }
                self.conditions.push((field, condition));
                self.conditions.len() - 1
            }
        };
        &mut self.conditions[index].1
    }
}
