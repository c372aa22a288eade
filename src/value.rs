//! Input values and the loose coercions the built-in rules rely on
//!
//! Form input arrives untyped: numbers may come in as strings, checkboxes as
//! booleans, multi-selects as arrays. The helpers here give the built-in rules
//! one consistent reading of such values.

use std::borrow::Cow;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Input mapping from field name to raw value.
pub type Fields = serde_json::Map<String, Value>;

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap());

/// Whether a value counts as empty: absent, null, `false`, zero, `""`, `"0"`,
/// or an empty array/object.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Numeric reading of a value: numbers, and strings that spell a number
/// (surrounding whitespace allowed).
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_str(s),
        _ => None,
    }
}

/// Parse a numeric string, rejecting anything with trailing text.
pub fn numeric_str(text: &str) -> Option<f64> {
    let text = text.trim();
    if NUMERIC.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Text form of a scalar value; arrays, objects and null have none.
pub fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("")),
        _ => None,
    }
}

/// Size used by the range rules: the number itself for numeric values, the
/// character count for other strings, the element count for arrays and objects.
pub fn magnitude(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    if let Some(n) = numeric(value) {
        return Some(n);
    }
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        _ => None,
    }
}

/// Coercive equality between two (possibly absent) values.
///
/// Absent and null are the same. Null or booleans against anything compare
/// by emptiness, except null against a string which only equals `""`.
/// Numbers and numeric strings compare numerically.
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    let left = left.unwrap_or(&Value::Null);
    let right = right.unwrap_or(&Value::Null);

    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
        (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => {
            is_empty(Some(left)) == is_empty(Some(right))
        }
        (Value::Number(_) | Value::String(_), Value::Number(_) | Value::String(_)) => {
            match (numeric(left), numeric(right)) {
                (Some(a), Some(b)) => a == b,
                _ => text(left) == text(right),
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(Some(x), Some(y)))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() && a.iter().all(|(k, v)| b.contains_key(k) && loose_eq(Some(v), b.get(k)))
        }
        (Value::Array(a), Value::Object(b)) | (Value::Object(b), Value::Array(a)) => {
            a.is_empty() && b.is_empty()
        }
        _ => false,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a date/time expression into a UTC timestamp.
///
/// Accepts RFC 3339 and RFC 2822 timestamps, common calendar layouts (naive
/// values are read as UTC), `@<unix seconds>`, and the words `now`, `today`,
/// `tomorrow` and `yesterday` relative to `now`.
pub fn timestamp(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).map(|t| Utc.from_utc_datetime(&t));

    match text.to_ascii_lowercase().as_str() {
        "now" => return Some(now),
        "today" | "midnight" => return midnight,
        "tomorrow" => return midnight.map(|t| t + Duration::days(1)),
        "yesterday" => return midnight.map(|t| t - Duration::days(1)),
        _ => {}
    }

    if let Some(seconds) = text.strip_prefix('@') {
        return seconds
            .parse::<i64>()
            .ok()
            .and_then(|s| Utc.timestamp_opt(s, 0).single());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|t| Utc.from_utc_datetime(&t));
        }
    }
    None
}
