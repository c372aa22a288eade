//! Rule sets read from JSON
//!
//! A rule set has up to three sections, each optional:
//!
//! ```json
//! {
//!     "rules":      { "website": "app::rules::Website" },
//!     "conditions": { "name": ["required", "alpha"], "url": "website" },
//!     "messages":   { "name": { "required": "Tell us your name" } }
//! }
//! ```
//!
//! `rules` maps custom rule names to type paths that must already be in the
//! validation's type catalogue (see [`Validation::register_type`]). It is
//! applied first, so conditions in the same document may use those names.
//! Sections are applied in document order within themselves.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::expression::{json_type, RuleToken};
use crate::validation::Validation;

impl Validation {
    /// Build a validation from a JSON rule set.
    ///
    /// Only built-in rules and the rule names declared in the document are
    /// available; use [`Validation::load`] to resolve custom type paths.
    ///
    /// # Example
    ///
    /// ```rust
    /// use floodgate::Validation;
    /// use floodgate::testing::fields;
    /// use serde_json::json;
    ///
    /// let validation = Validation::from_json(&json!({
    ///     "conditions": {"email": ["required", "email"]},
    ///     "messages": {"email": {"email": "That is not an address"}}
    /// }))
    /// .unwrap();
    ///
    /// let err = validation.validate(&fields(json!({"email": "nope"})), false).unwrap_err();
    /// assert_eq!(err.errors().unwrap().first("email"), Some("That is not an address"));
    /// ```
    pub fn from_json(config: &Value) -> Result<Self> {
        let mut validation = Validation::new();
        validation.load(config)?;
        Ok(validation)
    }

    /// Apply a JSON rule set on top of the current configuration.
    ///
    /// Fails with [`Error::InvalidRuleType`] for a malformed document or
    /// condition, [`Error::InvalidHandlerType`] for a non-string handler and
    /// [`Error::UnknownRule`] for a type path missing from the catalogue.
    /// Sections applied before the error stay applied.
    pub fn load(&mut self, config: &Value) -> Result<&mut Self> {
        let root = object(config, "rule set")?;

        if let Some(rules) = section(root, "rules")? {
            for (name, handler) in rules {
                self.registry_mut().register_value(name, handler)?;
            }
        }

        if let Some(conditions) = section(root, "conditions")? {
            for (field, rules) in conditions {
                let token = RuleToken::try_from(rules)?;
                self.condition(field.as_str(), token)?;
            }
        }

        if let Some(messages) = section(root, "messages")? {
            for (field, per_rule) in messages {
                for (rule, text) in object(per_rule, "message table")? {
                    let text = text.as_str().ok_or_else(|| {
                        Error::InvalidRuleType(format!("message for {}.{} ({})", field, rule, json_type(text)))
                    })?;
                    self.message(field.as_str(), rule.as_str(), text);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            conditions = self.conditions().count(),
            rules = self.rules().count(),
            "rule set loaded"
        );

        Ok(self)
    }
}

fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidRuleType(format!("{} ({})", what, json_type(value))))
}

fn section<'a>(root: &'a Map<String, Value>, name: &str) -> Result<Option<&'a Map<String, Value>>> {
    match root.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => object(value, name).map(Some),
    }
}
