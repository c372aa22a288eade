//! Semigroup trait for merging validation failures
//!
//! A Semigroup is a type with an associative binary operation. Validation runs
//! use it to merge the failures of every field into one
//! [`ErrorBag`](crate::ErrorBag) instead of stopping at the first one.
//!
//! # Laws
//!
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use floodgate::{ErrorBag, Semigroup};
//!
//! let mut name = ErrorBag::new();
//! name.push("name", "validation.required");
//! let mut email = ErrorBag::new();
//! email.push("email", "validation.email");
//!
//! let merged = name.combine(email);
//! assert_eq!(merged.fields().collect::<Vec<_>>(), ["name", "email"]);
//! ```

/// A type that supports an associative binary operation
///
/// `combine` takes both sides by value; clone first to keep the originals.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}
