//! Built-in rules
//!
//! The built-in set is a static table from rule name to a plain function. Names
//! are matched case-insensitively, ignoring `-`, `_` and spaces, so `alpha_num`,
//! `Alpha-Num` and `alphanum` all reach the same rule.
//!
//! Pattern rules (`alpha` through `email`) read strings and numbers only;
//! booleans, arrays and objects fail them.
//!
//! | Rule         | Passes when                                                   |
//! |--------------|---------------------------------------------------------------|
//! | `required`   | the value is present and not empty                            |
//! | `alpha`      | the value only has ASCII letters                              |
//! | `alphanum`   | the value only has ASCII letters and digits                   |
//! | `num`        | the value only has ASCII digits                               |
//! | `slug`       | the value only has lowercase letters, `-` and `_`             |
//! | `regex:P`    | the value matches `P` (`/body/flags` or a bare pattern)       |
//! | `email`      | the value looks like an email address                         |
//! | `same:F`     | the value loosely equals field `F`                            |
//! | `different:F`| the value does not loosely equal field `F`                    |
//! | `after:D`    | the value (default now) is a date strictly after `D`          |
//! | `before:D`   | the value (default now) is a date strictly before `D`         |
//! | `between:A,B`| the number, length or count is within `A..=B`                 |
//! | `min:N`      | the number, length or count is at least `N`                   |
//! | `max:N`      | the number, length or count is at most `N`                    |
//! | `size:N`     | the number, length or count is exactly `N`                    |
//! | `array`      | the value is an array or object                               |
//! | `numeric`    | the value is a number or a numeric string                     |
//! | `string`     | the value is a string                                         |

use std::fmt;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::rule::{Outcome, Rule};
use crate::value::{self, Fields};

type Check = fn(&Fields, &str, &[String]) -> Outcome;

/// A named built-in rule.
#[derive(Clone, Copy)]
pub struct Builtin {
    name: &'static str,
    check: Check,
}

impl Builtin {
    /// Canonical rule name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Builtin").field(&self.name).finish()
    }
}

impl Rule for Builtin {
    #[inline]
    fn check(&self, fields: &Fields, key: &str, options: &[String]) -> Outcome {
        (self.check)(fields, key, options)
    }
}

/// Every built-in rule, in documentation order.
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "required", check: required },
    Builtin { name: "alpha", check: alpha },
    Builtin { name: "alphanum", check: alphanum },
    Builtin { name: "num", check: num },
    Builtin { name: "slug", check: slug },
    Builtin { name: "regex", check: regex_match },
    Builtin { name: "email", check: email },
    Builtin { name: "same", check: same },
    Builtin { name: "different", check: different },
    Builtin { name: "after", check: after },
    Builtin { name: "before", check: before },
    Builtin { name: "between", check: between },
    Builtin { name: "min", check: min },
    Builtin { name: "max", check: max },
    Builtin { name: "size", check: size },
    Builtin { name: "array", check: array },
    Builtin { name: "numeric", check: numeric },
    Builtin { name: "string", check: string },
];

/// Normalise a rule name for lookup: lowercase, without `-`, `_` or spaces.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find a built-in rule by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    let wanted = normalize(name);
    BUILTINS.iter().find(|builtin| builtin.name == wanted)
}

static ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());
static ALPHANUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());
static NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_-]+$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

fn option(options: &[String], index: usize) -> Option<&str> {
    options.get(index).map(String::as_str)
}

/// Non-empty string or number at `fields[key]`, checked against a pattern.
fn full_match(fields: &Fields, key: &str, pattern: &Regex) -> bool {
    let input = fields.get(key);
    if value::is_empty(input) {
        return false;
    }
    match input {
        Some(scalar @ (Value::String(_) | Value::Number(_))) => {
            value::text(scalar).is_some_and(|text| pattern.is_match(&text))
        }
        _ => false,
    }
}

fn required(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(!value::is_empty(fields.get(key)), "validation.required")
}

fn alpha(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(full_match(fields, key, &ALPHA), "validation.alpha")
}

fn alphanum(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(full_match(fields, key, &ALPHANUM), "validation.alphanum")
}

fn num(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(full_match(fields, key, &NUM), "validation.num")
}

fn slug(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(full_match(fields, key, &SLUG), "validation.slug")
}

fn regex_match(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let valid = option(options, 0)
        .filter(|raw| !raw.trim().is_empty())
        .and_then(compile_pattern)
        .is_some_and(|pattern| full_match(fields, key, &pattern));
    Outcome::check(valid, "validation.regex")
}

fn email(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(full_match(fields, key, &EMAIL), "validation.email")
}

fn same(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let other = option(options, 1).and_then(|field| fields.get(field));
    Outcome::check(value::loose_eq(fields.get(key), other), "validation.same")
}

fn different(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let other = option(options, 1).and_then(|field| fields.get(field));
    Outcome::check(!value::loose_eq(fields.get(key), other), "validation.different")
}

/// Compare the field's timestamp (now when empty) against `options[1]`.
fn compare_dates(fields: &Fields, key: &str, options: &[String], accept: fn(i64) -> bool) -> bool {
    let now = Utc::now();
    let current = fields.get(key);
    let time = if value::is_empty(current) {
        Some(now)
    } else {
        current
            .and_then(value::text)
            .and_then(|text| value::timestamp(&text, now))
    };
    let limit = option(options, 1)
        .filter(|limit| !limit.is_empty() && *limit != "0")
        .and_then(|limit| value::timestamp(limit, now));

    match (time, limit) {
        (Some(time), Some(limit)) => accept((time - limit).num_milliseconds()),
        _ => false,
    }
}

fn after(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    Outcome::check(compare_dates(fields, key, options, |delta| delta > 0), "validation.after")
}

fn before(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    Outcome::check(compare_dates(fields, key, options, |delta| delta < 0), "validation.before")
}

/// Numeric option, defaulting to zero when missing.
fn bound(options: &[String], index: usize) -> Option<f64> {
    match option(options, index) {
        None => Some(0.0),
        Some(raw) => value::numeric_str(raw),
    }
}

fn between(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let valid = match (value::magnitude(fields.get(key)), bound(options, 1), bound(options, 2)) {
        (Some(size), Some(min), Some(max)) => size >= min && size <= max,
        _ => false,
    };
    Outcome::check(valid, "validation.between")
}

fn min(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let valid = match (value::magnitude(fields.get(key)), bound(options, 1)) {
        (Some(size), Some(min)) => size >= min,
        _ => false,
    };
    Outcome::check(valid, "validation.min")
}

fn max(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let valid = match (value::magnitude(fields.get(key)), bound(options, 1)) {
        (Some(size), Some(max)) => size <= max,
        _ => false,
    };
    Outcome::check(valid, "validation.max")
}

fn size(fields: &Fields, key: &str, options: &[String]) -> Outcome {
    let valid = match (value::magnitude(fields.get(key)), bound(options, 1)) {
        (Some(size), Some(expected)) => size == expected,
        _ => false,
    };
    Outcome::check(valid, "validation.size")
}

fn array(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    let valid = matches!(fields.get(key), Some(Value::Array(_) | Value::Object(_)));
    Outcome::check(valid, "validation.array")
}

fn numeric(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    let valid = fields.get(key).and_then(value::numeric).is_some();
    Outcome::check(valid, "validation.numeric")
}

fn string(fields: &Fields, key: &str, _: &[String]) -> Outcome {
    Outcome::check(matches!(fields.get(key), Some(Value::String(_))), "validation.string")
}

/// Compile a pattern written either bare or as `/body/flags`.
///
/// A delimited pattern starts with a non-alphanumeric, non-backslash,
/// non-whitespace character; bracket delimiters close with their pair.
/// Supported flags: `i`, `m`, `s`, `x`, `U`, plus `u` and `D` which are
/// accepted and ignored. Returns `None` for unknown flags, unterminated
/// delimiters or patterns that fail to compile.
pub fn compile_pattern(raw: &str) -> Option<Regex> {
    let raw = raw.trim();
    let open = raw.chars().next()?;
    if open.is_alphanumeric() || open == '\\' || open.is_whitespace() {
        return Regex::new(raw).ok();
    }

    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    };
    let rest = &raw[open.len_utf8()..];
    let end = rest.rfind(close)?;
    let (body, flags) = (&rest[..end], &rest[end + close.len_utf8()..]);

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' | 'U' => inline.push(flag),
            'u' | 'D' => {}
            _ => return None,
        }
    }

    let pattern = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", inline, body)
    };
    Regex::new(&pattern).ok()
}
