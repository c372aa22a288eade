//! Custom rule registry
//!
//! Each [`Validation`](crate::Validation) owns a [`Registry`]: a table of
//! custom rule names and the handlers behind them, plus a catalogue of rule
//! types that conditions may reference by their type path. Registries are
//! never shared between validations.

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::expression::json_type;
use crate::rule::{Rule, RuleFn, RuleType};

/// What a registered rule name resolves to.
#[derive(Clone)]
pub enum RuleHandler {
    /// A callback used as-is.
    Callback(RuleFn),
    /// A rule type instantiated for every check.
    Type(RuleType),
}

impl RuleHandler {
    /// Handler for a closure.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&crate::Fields, &str, &[String]) -> crate::Outcome + Send + Sync + 'static,
    {
        RuleHandler::Callback(crate::rule::rule_fn(f))
    }

    /// A rule ready to run: the callback itself, or a fresh type instance.
    pub fn resolve(&self) -> Resolved<'_> {
        match self {
            RuleHandler::Callback(rule) => Resolved::Borrowed(&**rule),
            RuleHandler::Type(handle) => Resolved::Owned(handle.instantiate()),
        }
    }
}

impl fmt::Debug for RuleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleHandler::Callback(_) => f.write_str("Callback(..)"),
            RuleHandler::Type(handle) => f.debug_tuple("Type").field(handle).finish(),
        }
    }
}

impl From<RuleFn> for RuleHandler {
    fn from(rule: RuleFn) -> Self {
        RuleHandler::Callback(rule)
    }
}

impl From<RuleType> for RuleHandler {
    fn from(handle: RuleType) -> Self {
        RuleHandler::Type(handle)
    }
}

/// A rule resolved for one check.
pub enum Resolved<'a> {
    /// A rule owned by the registry, a condition or the built-in table.
    Borrowed(&'a dyn Rule),
    /// A freshly instantiated rule type.
    Owned(Box<dyn Rule>),
}

impl Resolved<'_> {
    /// The rule to invoke.
    pub fn as_rule(&self) -> &dyn Rule {
        match self {
            Resolved::Borrowed(rule) => *rule,
            Resolved::Owned(rule) => rule.as_ref(),
        }
    }
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Borrowed(_) => f.write_str("Borrowed(..)"),
            Resolved::Owned(_) => f.write_str("Owned(..)"),
        }
    }
}

/// Custom rule names and known rule types for one validation.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Vec<(String, RuleHandler)>,
    types: Vec<RuleType>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a handler under `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Into<RuleHandler>) -> &mut Self {
        let name = name.into();
        let handler = handler.into();
        match self.rules.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = handler,
            None => self.rules.push((name, handler)),
        }
        self
    }

    /// Register a handler read from configuration.
    ///
    /// A string names a rule type from the catalogue; anything else fails
    /// with [`Error::InvalidHandlerType`].
    pub fn register_value(&mut self, name: &str, handler: &Value) -> Result<&mut Self> {
        let path = handler
            .as_str()
            .ok_or_else(|| Error::InvalidHandlerType(format!("{} ({})", name, json_type(handler))))?;
        let handle = self
            .find_type(path)
            .cloned()
            .ok_or_else(|| Error::UnknownRule(path.to_string()))?;
        Ok(self.register(name, handle))
    }

    /// Add a rule type to the catalogue, addressable by its type path.
    pub fn register_type(&mut self, handle: RuleType) -> &mut Self {
        match self.types.iter_mut().find(|known| known.name() == handle.name()) {
            Some(existing) => *existing = handle,
            None => self.types.push(handle),
        }
        self
    }

    /// Whether a custom rule is registered under `name`.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|(key, _)| key == name)
    }

    /// The handler registered under `name`.
    pub fn get_rule(&self, name: &str) -> Result<&RuleHandler> {
        self.rules
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, handler)| handler)
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &RuleHandler)> {
        self.rules.iter().map(|(name, handler)| (name.as_str(), handler))
    }

    /// A catalogued rule type by type path.
    pub fn find_type(&self, path: &str) -> Option<&RuleType> {
        self.types.iter().find(|handle| handle.name() == path)
    }

    /// Catalogued rule types in registration order.
    pub fn types(&self) -> &[RuleType] {
        &self.types
    }
}
