//! Testing utilities and helpers for floodgate
//!
//! Helpers for writing tests against [`Validation`](crate::Validation)s: a
//! shorthand for building input maps, assertion macros for the outcome of a
//! run, and (behind the `proptest` feature) strategies for generating inputs.
//!
//! # Examples
//!
//! ```rust
//! use floodgate::{assert_fails, assert_field_errors, assert_passes, Validation};
//! use floodgate::testing::fields;
//! use serde_json::json;
//!
//! let mut validation = Validation::new();
//! validation.condition("age", ["required", "numeric", "min:18"]).unwrap();
//!
//! assert_passes!(validation, fields(json!({"age": 42})));
//! assert_fails!(validation, fields(json!({"age": 12})));
//! assert_field_errors!(validation, fields(json!({})), "age", ["validation.required", "validation.numeric", "validation.min"]);
//! ```

use serde_json::Value;

use crate::value::Fields;

/// Turn a JSON object into an input map.
///
/// # Panics
///
/// Panics when `value` is not an object.
///
/// ```rust
/// use floodgate::testing::fields;
/// use serde_json::json;
///
/// let input = fields(json!({"name": "Alice"}));
/// assert_eq!(input["name"], "Alice");
/// ```
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("fields() expects a JSON object, got {}", other),
    }
}

/// Assert that a validation passes for the given input.
///
/// Accepts an optional third argument for `bail`.
///
/// # Example
///
/// ```rust
/// use floodgate::{assert_passes, Validation};
/// use floodgate::testing::fields;
/// use serde_json::json;
///
/// let mut validation = Validation::new();
/// validation.condition("name", "required").unwrap();
/// assert_passes!(validation, fields(json!({"name": "Alice"})));
/// ```
#[macro_export]
macro_rules! assert_passes {
    ($validation:expr, $fields:expr) => {
        $crate::assert_passes!($validation, $fields, false)
    };
    ($validation:expr, $fields:expr, $bail:expr) => {
        match $validation.validate(&$fields, $bail) {
            Ok(()) => {}
            Err(e) => {
                panic!("Expected validation to pass, got {:?}", e);
            }
        }
    };
}

/// Assert that a validation rejects the given input.
///
/// Configuration errors do not count as a rejection.
///
/// # Example
///
/// ```rust
/// use floodgate::{assert_fails, Validation};
/// use floodgate::testing::fields;
/// use serde_json::json;
///
/// let mut validation = Validation::new();
/// validation.condition("name", "required").unwrap();
/// assert_fails!(validation, fields(json!({})));
/// ```
#[macro_export]
macro_rules! assert_fails {
    ($validation:expr, $fields:expr) => {
        $crate::assert_fails!($validation, $fields, false)
    };
    ($validation:expr, $fields:expr, $bail:expr) => {
        match $validation.validate(&$fields, $bail) {
            Err($crate::Error::ValidationFailed(_)) => {}
            other => {
                panic!("Expected validation to fail, got {:?}", other);
            }
        }
    };
}

/// Assert the exact messages recorded for one field.
///
/// Runs without `bail`. An empty expectation asserts that the field passed.
///
/// # Example
///
/// ```rust
/// use floodgate::{assert_field_errors, Validation};
/// use floodgate::testing::fields;
/// use serde_json::json;
///
/// let mut validation = Validation::new();
/// validation.condition("name", ["required", "alpha"]).unwrap();
/// assert_field_errors!(validation, fields(json!({"name": "R2D2"})), "name", ["validation.alpha"]);
/// ```
#[macro_export]
macro_rules! assert_field_errors {
    ($validation:expr, $fields:expr, $field:expr, $expected:expr) => {
        match $validation.errors(&$fields, false) {
            Ok(bag) => {
                let actual: Vec<&str> = bag
                    .get($field)
                    .map(|messages| messages.iter().map(String::as_str).collect())
                    .unwrap_or_default();
                let expected: Vec<&str> = $expected.iter().map(|m| &**m).collect();
                assert_eq!(actual, expected, "messages for field {:?}", $field);
            }
            Err(e) => {
                panic!("Expected field errors {:?}, got {:?}", $expected, e);
            }
        }
    };
}

#[cfg(feature = "proptest")]
pub use self::strategies::*;

#[cfg(feature = "proptest")]
mod strategies {
    use proptest::prelude::*;
    use serde_json::Value;

    use crate::value::Fields;

    /// Field names: short lowercase identifiers.
    pub fn field_name() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,7}"
    }

    /// Scalar JSON values of every kind, including the ones counted as empty.
    pub fn scalar() -> BoxedStrategy<Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            (-1.0e6..1.0e6f64).prop_map(Value::from),
            "[ -~]{0,12}".prop_map(Value::String),
        ]
        .boxed()
    }

    /// Well-formed expressions naming a built-in rule, some with numeric options.
    pub fn rule_expression() -> BoxedStrategy<String> {
        let names: Vec<&'static str> = crate::builtin::BUILTINS.iter().map(|rule| rule.name()).collect();
        (
            proptest::sample::select(names),
            proptest::option::of(proptest::collection::vec(0u32..100, 1..3)),
        )
            .prop_map(|(name, options)| match options {
                Some(values) => {
                    let values: Vec<String> = values.iter().map(u32::to_string).collect();
                    format!("{}:{}", name, values.join(","))
                }
                None => name.to_string(),
            })
            .boxed()
    }

    /// Input maps of up to eight scalar fields.
    pub fn input() -> BoxedStrategy<Fields> {
        proptest::collection::vec((field_name(), scalar()), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect())
            .boxed()
    }
}
