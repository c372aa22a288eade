//! Field-keyed error bag
//!
//! An [`ErrorBag`] maps field names to the ordered list of messages recorded
//! for them. Fields keep the order in which they were first inserted, which is
//! the order their conditions were checked.
//!
//! # Examples
//!
//! ```
//! use floodgate::{ErrorBag, Semigroup};
//!
//! let mut first = ErrorBag::new();
//! first.push("email", "validation.required");
//!
//! let mut second = ErrorBag::new();
//! second.push("email", "validation.email");
//! second.push("name", "validation.alpha");
//!
//! let bag = first.combine(second);
//! assert_eq!(bag.fields().collect::<Vec<_>>(), vec!["email", "name"]);
//! assert_eq!(bag.get("email").unwrap().len(), 2);
//! ```

use crate::Semigroup;

/// Insertion-ordered mapping from field name to error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBag {
    entries: Vec<(String, Vec<String>)>,
}

impl ErrorBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field, adding the field if it is new.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(key, _)| *key == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    /// Append several messages to a field.
    pub fn extend<I, S>(&mut self, field: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.push(field, message);
        }
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// The first message recorded for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Whether the bag holds messages for a field.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate `(field, messages)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }

    /// All messages across every field, in order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, messages)| messages.iter().map(String::as_str))
    }

    /// Number of fields with messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field has messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object of `field: [messages]`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, messages)| (key.clone(), serde_json::json!(messages)))
                .collect(),
        )
    }
}

impl Semigroup for ErrorBag {
    fn combine(mut self, other: Self) -> Self {
        for (field, messages) in other.entries {
            if messages.is_empty() {
                continue;
            }
            match self.entries.iter_mut().find(|(key, _)| *key == field) {
                Some((_, existing)) => *existing = std::mem::take(existing).combine(messages),
                None => self.entries.push((field, messages)),
            }
        }
        self
    }
}

impl IntoIterator for ErrorBag {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ErrorBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = ErrorBag::new();
        for (field, message) in iter {
            bag.push(field, message);
        }
        bag
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ErrorBag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}
