//! Per-field rule chains
//!
//! A [`Condition`] holds the rules attached to one field, in the order they
//! were attached. Checking a condition resolves every rule, runs it against the
//! input and collects the messages of the rules that failed.
//!
//! Named rules resolve in this order:
//!
//! 1. a rule type whose type path equals the name, from the registry catalogue
//! 2. a built-in rule (see [`builtin`](crate::builtin))
//! 3. a custom rule registered under the name
//!
//! A name that matches none of these is an [`Error::UnknownRule`].
//!
//! # Example
//!
//! ```rust
//! use floodgate::{Condition, Registry};
//! use floodgate::testing::fields;
//! use serde_json::json;
//!
//! let mut condition = Condition::new();
//! condition.rule(["required", "email"]).unwrap();
//!
//! let report = condition
//!     .check(&fields(json!({})), "email", false, &Registry::new())
//!     .unwrap();
//! assert_eq!(report.messages(), ["validation.required", "validation.email"]);
//!
//! let report = condition
//!     .check(&fields(json!({})), "email", true, &Registry::new())
//!     .unwrap();
//! assert_eq!(report.messages(), ["validation.required"]);
//! ```

use crate::bag::ErrorBag;
use crate::builtin;
use crate::error::{Error, Result};
use crate::expression::{RuleDescriptor, RuleKind, RuleToken};
use crate::registry::{Registry, Resolved};
use crate::rule::Outcome;
use crate::value::Fields;

/// The ordered rule chain of one field.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    rules: Vec<RuleDescriptor>,
    messages: Vec<(String, String)>,
}

impl Condition {
    /// Create a condition with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one token (or a sequence of tokens) to the end of the chain.
    ///
    /// The whole token is parsed before anything is attached, so a malformed
    /// expression leaves the condition unchanged.
    pub fn rule(&mut self, token: impl Into<RuleToken>) -> Result<&mut Self> {
        let descriptors = token.into().descriptors()?;
        self.rules.extend(descriptors);
        Ok(self)
    }

    /// Replace the message recorded when `rule` fails.
    ///
    /// `rule` is a rule name (matched like built-in names) or the type path of
    /// a rule type.
    pub fn message(&mut self, rule: impl Into<String>, message: impl Into<String>) -> &mut Self {
        let rule = rule.into();
        let message = message.into();
        match self.messages.iter_mut().find(|(key, _)| *key == rule) {
            Some((_, existing)) => *existing = message,
            None => self.messages.push((rule, message)),
        }
        self
    }

    /// Attached rules in evaluation order.
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Number of attached rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are attached.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check `fields[key]` against every rule.
    ///
    /// With `bail`, evaluation stops at the first failing rule. Resolution
    /// errors abort the check and are returned as-is.
    pub fn check(&self, fields: &Fields, key: &str, bail: bool, registry: &Registry) -> Result<FieldReport> {
        let mut report = FieldReport::new(key);

        for descriptor in &self.rules {
            let resolved = resolve(descriptor, registry)?;
            let outcome = resolved.as_rule().check(fields, key, descriptor.options());

            if let Outcome::Fail(message) = outcome {
                let message = self
                    .custom_message(descriptor)
                    .map(str::to_string)
                    .or(message)
                    .unwrap_or_else(|| descriptor.default_message());

                #[cfg(feature = "tracing")]
                tracing::trace!(field = key, rule = descriptor.expression(), message = %message, "rule failed");

                report.messages.push(message);
                if bail {
                    break;
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            field = key,
            passed = report.passed(),
            failures = report.messages.len(),
            "condition checked"
        );

        Ok(report)
    }

    fn custom_message(&self, descriptor: &RuleDescriptor) -> Option<&str> {
        let applies = |rule: &str| match descriptor.kind() {
            RuleKind::Named(name) => builtin::normalize(name) == builtin::normalize(rule),
            RuleKind::CustomClass(handle) => handle.name() == rule,
            RuleKind::InlineCallback(_) => false,
        };
        self.messages
            .iter()
            .find(|(rule, _)| applies(rule.as_str()))
            .map(|(_, message)| message.as_str())
    }
}

/// Resolve a descriptor to a runnable rule.
pub fn resolve<'a>(descriptor: &'a RuleDescriptor, registry: &'a Registry) -> Result<Resolved<'a>> {
    match descriptor.kind() {
        RuleKind::InlineCallback(rule) => Ok(Resolved::Borrowed(&**rule)),
        RuleKind::CustomClass(handle) => Ok(Resolved::Owned(handle.instantiate())),
        RuleKind::Named(name) => {
            if let Some(handle) = registry.find_type(name) {
                return Ok(Resolved::Owned(handle.instantiate()));
            }
            if let Some(rule) = builtin::lookup(name) {
                return Ok(Resolved::Borrowed(rule));
            }
            match registry.get_rule(name) {
                Ok(handler) => Ok(handler.resolve()),
                Err(_) => Err(Error::UnknownRule(name.clone())),
            }
        }
    }
}

/// The result of checking one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    key: String,
    messages: Vec<String>,
}

impl FieldReport {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            messages: Vec::new(),
        }
    }

    /// The checked field.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether every evaluated rule passed.
    pub fn passed(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages of the failed rules, in evaluation order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// The failures as a one-field error bag (empty when the field passed).
    pub fn errors(&self) -> ErrorBag {
        let mut bag = ErrorBag::new();
        bag.extend(&self.key, self.messages.iter().cloned());
        bag
    }

    /// Consume the report, returning its messages.
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleHandler;
    use crate::rule::{Rule, RuleType};
    use crate::testing::fields;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Website;

    impl Rule for Website {
        fn check(&self, fields: &Fields, key: &str, _: &[String]) -> Outcome {
            let valid = fields
                .get(key)
                .and_then(|v| v.as_str())
                .is_some_and(|url| url.starts_with("http://") || url.starts_with("https://"));
            Outcome::check(valid, "Invalid Website specified")
        }
    }

    #[derive(Default)]
    struct Silent;

    impl Rule for Silent {
        fn check(&self, _: &Fields, _: &str, _: &[String]) -> Outcome {
            Outcome::Fail(None)
        }
    }

    fn check(condition: &Condition, input: serde_json::Value, bail: bool) -> Result<FieldReport> {
        condition.check(&fields(input), "test", bail, &Registry::new())
    }

    #[test]
    fn test_rule_appends_in_order() {
        let mut condition = Condition::new();
        condition
            .rule("required")
            .unwrap()
            .rule(vec!["alpha", "max:5"])
            .unwrap();
        let names: Vec<_> = condition.rules().iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["required", "alpha", "max"]);
        assert_eq!(condition.len(), 3);
    }

    #[test]
    fn test_bad_token_leaves_condition_unchanged() {
        let mut condition = Condition::new();
        condition.rule("required").unwrap();
        assert!(condition.rule(vec!["alpha", ":oops"]).is_err());
        assert_eq!(condition.len(), 1);
    }

    #[test]
    fn test_check_collects_every_failure_without_bail() {
        let mut condition = Condition::new();
        condition.rule(["required", "email"]).unwrap();

        let report = check(&condition, json!({}), false).unwrap();
        assert!(!report.passed());
        assert_eq!(report.key(), "test");
        assert_eq!(report.messages(), ["validation.required", "validation.email"]);

        let report = check(&condition, json!({"test": "a@b.com"}), false).unwrap();
        assert!(report.passed());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_bail_stops_at_first_failure() {
        let mut condition = Condition::new();
        condition.rule(["required", "max:255"]).unwrap();
        let report = check(&condition, json!({}), true).unwrap();
        assert_eq!(report.messages(), ["validation.required"]);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut condition = Condition::new();
        condition.rule(["alpha", "max:3"]).unwrap();
        let first = check(&condition, json!({"test": "abc1"}), false).unwrap();
        let second = check(&condition, json!({"test": "abc1"}), false).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.messages(), ["validation.alpha", "validation.max"]);
    }

    #[test]
    fn test_unknown_rule_aborts() {
        let mut condition = Condition::new();
        condition.rule(["crispy", "max:255"]).unwrap();
        assert_eq!(
            check(&condition, json!({}), true).unwrap_err(),
            Error::UnknownRule("crispy".into())
        );
    }

    #[test]
    fn test_unknown_rule_after_failure_still_aborts() {
        let mut condition = Condition::new();
        condition.rule(["required", "crispy"]).unwrap();
        assert!(check(&condition, json!({}), false).is_err());
    }

    #[test]
    fn test_inline_callback_message() {
        let mut condition = Condition::new();
        condition
            .rule(RuleToken::callback(|fields, key, _| {
                Outcome::check(fields.contains_key(key), "Invalid Website specified")
            }))
            .unwrap();
        assert!(check(&condition, json!({"test": 1}), false).unwrap().passed());
        assert_eq!(
            check(&condition, json!({}), false).unwrap().messages(),
            ["Invalid Website specified"]
        );
    }

    #[test]
    fn test_default_messages_for_silent_failures() {
        let mut condition = Condition::new();
        condition
            .rule(RuleToken::callback(|_, _, _| Outcome::Fail(None)))
            .unwrap()
            .rule(RuleType::new("app::Silent", || Box::new(Silent)))
            .unwrap();
        assert_eq!(
            check(&condition, json!({}), false).unwrap().messages(),
            ["Failed validation for Closure rule", "Failed validation for app::Silent rule"]
        );
    }

    #[test]
    fn test_custom_class_is_instantiated_per_check() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);
        let mut condition = Condition::new();
        condition
            .rule(RuleType::new("app::Website", || {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Box::new(Website)
            }))
            .unwrap();

        assert!(check(&condition, json!({"test": "https://vecode.net"}), false).unwrap().passed());
        assert!(!check(&condition, json!({"test": "Lorem ipsum"}), false).unwrap().passed());
        assert_eq!(BUILT.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolution_prefers_type_then_builtin_then_registry() {
        let mut registry = Registry::new();
        registry.register_type(RuleType::new("required", || {
            Box::new(|_: &Fields, _: &str, _: &[String]| Outcome::fail("from type"))
        }));
        registry.register("email", RuleHandler::callback(|_, _, _| Outcome::fail("registry email")));
        registry.register("website", RuleType::of::<Website>());

        let mut condition = Condition::new();
        condition.rule(["required", "email", "website"]).unwrap();
        let report = condition
            .check(&fields(json!({"test": "nope"})), "test", false, &registry)
            .unwrap();
        assert_eq!(
            report.messages(),
            ["from type", "validation.email", "Invalid Website specified"]
        );
    }

    #[test]
    fn test_registry_callback_receives_options() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = Registry::new();
        registry.register(
            "one_of",
            RuleHandler::callback(move |_, _, options| {
                sink.lock().unwrap().extend(options.iter().cloned());
                Outcome::Pass
            }),
        );

        let mut condition = Condition::new();
        condition.rule("one_of:red, green").unwrap();
        condition.check(&Fields::new(), "colour", false, &registry).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["red, green", "red", "green"]);
    }

    #[test]
    fn test_custom_messages_override_rule_messages() {
        let mut condition = Condition::new();
        condition
            .rule(["required", "email"])
            .unwrap()
            .message("Required", "Please enter an email")
            .message(std::any::type_name::<Website>(), "Bad site")
            .rule(RuleType::of::<Website>())
            .unwrap();

        assert_eq!(
            check(&condition, json!({}), false).unwrap().messages(),
            ["Please enter an email", "validation.email", "Bad site"]
        );
    }

    #[test]
    fn test_report_errors_bag() {
        let mut condition = Condition::new();
        condition.rule("required").unwrap();
        let bag = check(&condition, json!({}), false).unwrap().errors();
        assert_eq!(bag.get("test"), Some(&["validation.required".to_string()][..]));
    }
}
