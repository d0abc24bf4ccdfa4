//! Strongly-typed identifiers used across the domain.
//!
//! Both identifiers are opaque strings supplied by the outside world (an ISBN
//! from the catalog feed, a membership number from the front desk), so they
//! wrap `String` rather than a generated uuid.

use serde::{Deserialize, Serialize};

/// Identifier of a book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

/// Identifier of a registered member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

impl_string_newtype!(Isbn);
impl_string_newtype!(MemberId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(Isbn::from("111"), Isbn::new("111"));
        assert_ne!(MemberId::from("M1"), MemberId::from("M2"));
    }

    #[test]
    fn display_is_the_raw_identifier() {
        assert_eq!(Isbn::from("978-0132350884").to_string(), "978-0132350884");
    }
}
