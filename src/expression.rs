//! Rule expressions and their parsed descriptors
//!
//! A rule is written as `name` or `name:opt1,opt2,...`. Parsing splits the part
//! after the colon on commas, and also keeps the unsplit remainder as the first
//! option. Rules that take a single free-form argument (such as a regular
//! expression that may itself contain commas) read `options[0]`; rules taking
//! a list of values read from `options[1]` on.
//!
//! ```rust
//! use floodgate::expression::{parse, RuleKind};
//!
//! let descriptor = parse("between:5, 10").unwrap();
//! assert!(matches!(descriptor.kind(), RuleKind::Named(name) if name == "between"));
//! assert_eq!(descriptor.options(), ["5, 10", "5", "10"]);
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::rule::{RuleFn, RuleType};

static OPTION_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").unwrap());

/// What a descriptor refers to.
#[derive(Clone)]
pub enum RuleKind {
    /// A rule looked up by name when the condition is checked.
    Named(String),
    /// A rule type instantiated for every check.
    CustomClass(RuleType),
    /// A callback invoked directly.
    InlineCallback(RuleFn),
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Named(name) => f.debug_tuple("Named").field(name).finish(),
            RuleKind::CustomClass(handle) => f.debug_tuple("CustomClass").field(&handle.name()).finish(),
            RuleKind::InlineCallback(_) => f.write_str("InlineCallback(..)"),
        }
    }
}

/// A parsed rule: its kind, its options and the expression it came from.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    kind: RuleKind,
    options: Vec<String>,
    expression: String,
}

impl RuleDescriptor {
    /// Descriptor for a rule type handle.
    pub fn custom(handle: RuleType) -> Self {
        Self {
            expression: handle.name().to_string(),
            kind: RuleKind::CustomClass(handle),
            options: Vec::new(),
        }
    }

    /// Descriptor for an inline callback.
    pub fn callback(rule: RuleFn) -> Self {
        Self {
            kind: RuleKind::InlineCallback(rule),
            options: Vec::new(),
            expression: String::new(),
        }
    }

    /// The rule kind.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Parsed options; `options[0]` is the unsplit remainder when present.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The source expression (empty for callbacks, the type path for types).
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Name of a named rule.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Named(name) => Some(name),
            _ => None,
        }
    }

    /// The message recorded when the rule fails without giving one.
    pub fn default_message(&self) -> String {
        match &self.kind {
            RuleKind::Named(name) => format!("validation.{}", name),
            RuleKind::CustomClass(handle) => format!("Failed validation for {} rule", handle.name()),
            RuleKind::InlineCallback(_) => "Failed validation for Closure rule".to_string(),
        }
    }
}

/// Parse a rule expression string into a named descriptor.
///
/// Fails with [`Error::InvalidExpression`] when there is no rule name before
/// the colon or the expression spans several lines.
pub fn parse(expression: &str) -> Result<RuleDescriptor> {
    if expression.contains(['\n', '\r']) {
        return Err(Error::InvalidExpression(expression.to_string()));
    }

    let (name, remainder) = match expression.split_once(':') {
        Some((name, remainder)) => (name, Some(remainder)),
        None => (expression, None),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidExpression(expression.to_string()));
    }

    let options = match remainder {
        Some(raw) if !raw.trim().is_empty() => std::iter::once(raw.to_string())
            .chain(OPTION_SEPARATOR.split(raw.trim()).map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(RuleDescriptor {
        kind: RuleKind::Named(name.to_string()),
        options,
        expression: expression.to_string(),
    })
}

/// Anything that can be attached to a condition.
///
/// Strings, rule type handles and callbacks convert into tokens; so do vectors
/// and arrays of tokens, which attach every element in order.
#[derive(Clone)]
pub enum RuleToken {
    /// A rule expression such as `"max:255"`.
    Expression(String),
    /// A rule type handle.
    Type(RuleType),
    /// An inline callback.
    Callback(RuleFn),
    /// Several tokens attached in order.
    Sequence(Vec<RuleToken>),
}

impl RuleToken {
    /// Token for a closure.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&crate::Fields, &str, &[String]) -> crate::Outcome + Send + Sync + 'static,
    {
        RuleToken::Callback(crate::rule::rule_fn(f))
    }

    /// Parse the token into descriptors, flattening sequences.
    pub fn descriptors(&self) -> Result<Vec<RuleDescriptor>> {
        let mut out = Vec::new();
        self.collect_into(&mut out)?;
        Ok(out)
    }

    fn collect_into(&self, out: &mut Vec<RuleDescriptor>) -> Result<()> {
        match self {
            RuleToken::Expression(expression) => out.push(parse(expression)?),
            RuleToken::Type(handle) => out.push(RuleDescriptor::custom(handle.clone())),
            RuleToken::Callback(rule) => out.push(RuleDescriptor::callback(rule.clone())),
            RuleToken::Sequence(tokens) => {
                for token in tokens {
                    token.collect_into(out)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Expression(expression) => f.debug_tuple("Expression").field(expression).finish(),
            RuleToken::Type(handle) => f.debug_tuple("Type").field(handle).finish(),
            RuleToken::Callback(_) => f.write_str("Callback(..)"),
            RuleToken::Sequence(tokens) => f.debug_tuple("Sequence").field(tokens).finish(),
        }
    }
}

impl From<&str> for RuleToken {
    fn from(expression: &str) -> Self {
        RuleToken::Expression(expression.to_string())
    }
}

impl From<String> for RuleToken {
    fn from(expression: String) -> Self {
        RuleToken::Expression(expression)
    }
}

impl From<&String> for RuleToken {
    fn from(expression: &String) -> Self {
        RuleToken::Expression(expression.clone())
    }
}

impl From<RuleType> for RuleToken {
    fn from(handle: RuleType) -> Self {
        RuleToken::Type(handle)
    }
}

impl From<RuleFn> for RuleToken {
    fn from(rule: RuleFn) -> Self {
        RuleToken::Callback(rule)
    }
}

impl<T: Into<RuleToken>> From<Vec<T>> for RuleToken {
    fn from(tokens: Vec<T>) -> Self {
        RuleToken::Sequence(tokens.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RuleToken>, const N: usize> From<[T; N]> for RuleToken {
    fn from(tokens: [T; N]) -> Self {
        RuleToken::Sequence(tokens.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&Value> for RuleToken {
    type Error = Error;

    /// Read a token from configuration: a string or an array of strings.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(expression) => Ok(RuleToken::Expression(expression.clone())),
            Value::Array(items) => items
                .iter()
                .map(RuleToken::try_from)
                .collect::<Result<Vec<_>>>()
                .map(RuleToken::Sequence),
            other => Err(Error::InvalidRuleType(json_type(other).to_string())),
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;
    use serde_json::json;

    fn named(descriptor: &RuleDescriptor) -> &str {
        descriptor.name().expect("named descriptor")
    }

    #[test]
    fn test_parse_bare_name() {
        let d = parse("required").unwrap();
        assert_eq!(named(&d), "required");
        assert!(d.options().is_empty());
        assert_eq!(d.expression(), "required");
    }

    #[test]
    fn test_parse_duplicates_raw_remainder_as_first_option() {
        let d = parse("max:255").unwrap();
        assert_eq!(named(&d), "max");
        assert_eq!(d.options(), ["255", "255"]);

        let d = parse("between:5,10").unwrap();
        assert_eq!(d.options(), ["5,10", "5", "10"]);
    }

    #[test]
    fn test_parse_trims_name_and_keeps_raw_remainder() {
        let d = parse("  between : 5,  10").unwrap();
        assert_eq!(named(&d), "between");
        assert_eq!(d.options(), [" 5,  10", "5", "10"]);
    }

    #[test]
    fn test_parse_splits_only_on_first_colon() {
        let d = parse("after:2020-01-01 10:00:00").unwrap();
        assert_eq!(named(&d), "after");
        assert_eq!(d.options(), ["2020-01-01 10:00:00", "2020-01-01 10:00:00"]);
    }

    #[test]
    fn test_parse_regex_keeps_commas_in_first_option() {
        let d = parse("regex:/^a{1,3}$/").unwrap();
        assert_eq!(d.options()[0], "/^a{1,3}$/");
        assert_eq!(&d.options()[1..], ["/^a{1", "3}$/"]);
    }

    #[test]
    fn test_parse_empty_remainder_has_no_options() {
        assert!(parse("max:").unwrap().options().is_empty());
        assert!(parse("max:   ").unwrap().options().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_expressions() {
        for bad in ["", ":5", "  :5", "max\n:5"] {
            assert_eq!(parse(bad).unwrap_err(), Error::InvalidExpression(bad.to_string()));
        }
    }

    #[test]
    fn test_sequence_tokens_flatten_in_order() {
        let token = RuleToken::from(vec![
            RuleToken::from("required"),
            RuleToken::from(["alpha", "max:5"]),
            RuleToken::callback(|_, _, _| Outcome::Pass),
        ]);
        let descriptors = token.descriptors().unwrap();
        assert_eq!(descriptors.len(), 4);
        assert_eq!(named(&descriptors[0]), "required");
        assert_eq!(named(&descriptors[1]), "alpha");
        assert_eq!(named(&descriptors[2]), "max");
        assert!(matches!(descriptors[3].kind(), RuleKind::InlineCallback(_)));
        assert!(descriptors[3].options().is_empty());
    }

    #[test]
    fn test_sequence_stops_at_first_bad_expression() {
        let token = RuleToken::from(vec!["required", ":bad", "email"]);
        assert_eq!(
            token.descriptors().unwrap_err(),
            Error::InvalidExpression(":bad".into())
        );
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(parse("max:3").unwrap().default_message(), "validation.max");
        let cb = RuleDescriptor::callback(crate::rule_fn(|_, _, _| Outcome::Pass));
        assert_eq!(cb.default_message(), "Failed validation for Closure rule");
        let ty = RuleDescriptor::custom(RuleType::new("app::Website", || {
            Box::new(|_: &crate::Fields, _: &str, _: &[String]| Outcome::Pass)
        }));
        assert_eq!(ty.default_message(), "Failed validation for app::Website rule");
        assert_eq!(ty.expression(), "app::Website");
    }

    #[test]
    fn test_token_from_json() {
        let token = RuleToken::try_from(&json!(["required", "email"])).unwrap();
        assert_eq!(token.descriptors().unwrap().len(), 2);

        assert!(RuleToken::try_from(&json!("required")).is_ok());
        assert_eq!(
            RuleToken::try_from(&json!(5)).unwrap_err(),
            Error::InvalidRuleType("number".into())
        );
        assert_eq!(
            RuleToken::try_from(&json!(["required", {"x": 1}])).unwrap_err(),
            Error::InvalidRuleType("object".into())
        );
    }
}
