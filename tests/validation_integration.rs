//! End-to-end tests for configuring and running validations

use floodgate::prelude::*;
use floodgate::testing::fields;
use floodgate::{assert_fails, assert_field_errors, assert_passes, RuleToken};
use serde_json::json;

// Example domain rule: a field must differ from a reserved word list
#[derive(Default)]
struct NotReserved;

impl Rule for NotReserved {
    fn check(&self, fields: &Fields, key: &str, options: &[String]) -> Outcome {
        let reserved = ["admin", "root", "system"];
        match fields.get(key).and_then(|v| v.as_str()) {
            Some(name) if reserved.contains(&name) => Outcome::fail(format!("{} is reserved", name)),
            Some(name) if options.iter().skip(1).any(|o| o == name) => Outcome::Fail(None),
            _ => Outcome::Pass,
        }
    }
}

fn signup() -> Validation {
    let mut validation = Validation::new();
    validation
        .rule("not_reserved", RuleType::of::<NotReserved>())
        .condition("username", ["required", "alphanum", "between:3,16", "not_reserved"])
        .unwrap()
        .condition("email", ["required", "email"])
        .unwrap()
        .condition("password", ["required", "min:8"])
        .unwrap()
        .condition("password_confirmation", "same:password")
        .unwrap()
        .message("password", "min", "Use at least 8 characters");
    validation
}

#[test]
fn test_signup_accepts_valid_input() {
    assert_passes!(
        signup(),
        fields(json!({
            "username": "alice42",
            "email": "alice@example.com",
            "password": "correct horse",
            "password_confirmation": "correct horse"
        }))
    );
}

#[test]
fn test_signup_reports_every_failing_field() {
    let input = fields(json!({
        "username": "admin",
        "email": "alice@",
        "password": "short",
        "password_confirmation": "shorter"
    }));

    let bag = signup().errors(&input, false).unwrap();

    assert_eq!(
        bag.fields().collect::<Vec<_>>(),
        ["username", "email", "password", "password_confirmation"]
    );
    assert_eq!(bag.get("username").unwrap(), ["admin is reserved"]);
    assert_eq!(bag.get("password").unwrap(), ["Use at least 8 characters"]);
    assert_eq!(bag.first("password_confirmation"), Some("validation.same"));
}

#[test]
fn test_bail_returns_a_single_message() {
    let validation = signup();
    let err = validation.validate(&fields(json!({})), true).unwrap_err();
    let bag = err.into_errors().unwrap();

    assert_eq!(bag.len(), 1);
    assert_eq!(bag.messages().collect::<Vec<_>>(), ["validation.required"]);
}

#[test]
fn test_type_rule_default_message() {
    let mut validation = Validation::new();
    validation.condition("username", "not_reserved:guest").unwrap();
    validation.rule("not_reserved", RuleType::of::<NotReserved>());

    assert_field_errors!(
        validation,
        fields(json!({"username": "guest"})),
        "username",
        ["validation.not_reserved"]
    );
}

#[test]
fn test_inline_type_gets_no_options() {
    let mut validation = Validation::new();
    validation.condition("username", RuleType::of::<NotReserved>()).unwrap();

    // Inline types get no options, so only the reserved list applies.
    assert_passes!(validation, fields(json!({"username": "guest"})));
    assert_field_errors!(
        validation,
        fields(json!({"username": "root"})),
        "username",
        ["root is reserved"]
    );
}

#[test]
fn test_type_path_resolves_from_catalogue() {
    let handle = RuleType::of::<NotReserved>();
    let path = handle.name().to_string();

    let mut validation = Validation::new();
    validation.register_type(handle);
    validation.condition("username", path.as_str()).unwrap();

    assert_fails!(validation, fields(json!({"username": "system"})));
    assert_passes!(validation, fields(json!({"username": "bob"})));
}

#[test]
fn test_mixed_token_sequence() {
    let even = RuleToken::callback(|fields, key, _| {
        let even = fields.get(key).and_then(|v| v.as_i64()).is_some_and(|n| n % 2 == 0);
        Outcome::check(even, "must be even")
    });

    let mut validation = Validation::new();
    validation
        .condition(
            "count",
            RuleToken::Sequence(vec!["required".into(), "numeric".into(), even]),
        )
        .unwrap();

    assert_passes!(validation, fields(json!({"count": 10})));
    assert_field_errors!(validation, fields(json!({"count": 7})), "count", ["must be even"]);
}

#[test]
fn test_unknown_rule_is_a_configuration_error() {
    let mut validation = Validation::new();
    validation.condition("food", "crispy").unwrap();

    let err = validation.validate(&fields(json!({"food": "bacon"})), false).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err, Error::UnknownRule("crispy".into()));
}

#[test]
fn test_registered_rule_after_condition() {
    let mut validation = Validation::new();
    validation.condition("food", "crispy").unwrap();
    validation.rule(
        "crispy",
        RuleHandler::callback(|fields, key, _| Outcome::check(fields.get(key) == Some(&json!("bacon")), "soggy")),
    );

    assert_passes!(validation, fields(json!({"food": "bacon"})));
    assert_field_errors!(validation, fields(json!({"food": "tofu"})), "food", ["soggy"]);
}

#[test]
fn test_error_bag_to_json() {
    let bag = signup()
        .errors(&fields(json!({"username": "bob", "email": "bob@example.com"})), false)
        .unwrap();

    assert_eq!(
        bag.to_json(),
        json!({
            "password": ["validation.required", "Use at least 8 characters"]
        })
    );
}

#[test]
fn test_date_rules() {
    let mut validation = Validation::new();
    validation
        .condition("starts", "after:2020-01-01")
        .unwrap()
        .condition("ends", "before:2030-01-01 00:00:00")
        .unwrap();

    assert_passes!(
        validation,
        fields(json!({"starts": "2024-05-01", "ends": "2029-12-31T23:59:59Z"}))
    );
    let bag = validation
        .errors(&fields(json!({"starts": "2019-12-31", "ends": "not a date"})), false)
        .unwrap();
    assert_eq!(bag.first("starts"), Some("validation.after"));
    assert_eq!(bag.first("ends"), Some("validation.before"));
}

#[test]
fn test_json_rule_set() {
    let mut validation = Validation::new();
    validation.register_type(RuleType::new("accounts::NotReserved", || Box::new(NotReserved)));
    validation
        .load(&json!({
            "rules": {"not_reserved": "accounts::NotReserved"},
            "conditions": {
                "username": ["required", "not_reserved"],
                "tags": ["array", "max:3"]
            },
            "messages": {"tags": {"max": "Three tags at most"}}
        }))
        .unwrap();

    assert_passes!(validation, fields(json!({"username": "bob", "tags": ["a", "b"]})));

    let bag = validation
        .errors(&fields(json!({"username": "root", "tags": ["a", "b", "c", "d"]})), false)
        .unwrap();
    assert_eq!(bag.first("username"), Some("root is reserved"));
    assert_eq!(bag.get("tags").unwrap(), ["Three tags at most"]);
}
