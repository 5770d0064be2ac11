//! Strongly-typed identifiers.
//!
//! Content ids are allocated by the host content store and are plain
//! integers. Inclusion ids and actor names are author- or host-chosen
//! strings that must not be blank.
//!
//! # Examples
//!
//! ```
//! use perimeter_core::id::{ContentId, InclusionId};
//! use std::str::FromStr;
//!
//! let id = ContentId::from_str("42").unwrap();
//! assert_eq!(id.get(), 42);
//!
//! assert!(InclusionId::new("  ").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdError;

/// Identifier of any content item (page, blog post, comment, attachment).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(u64);

impl ContentId {
    /// Wrap a raw content id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = IdError;

    /// Parse a non-negative decimal id. Signs and whitespace are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidContentId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| IdError::InvalidContentId(s.to_string()))
    }
}

macro_rules! text_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create the identifier, rejecting blank values.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdError::Blank($label));
                }
                Ok(Self(value))
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_id!(
    /// Author-chosen token distinguishing the secure includes of one host document.
    InclusionId,
    "inclusion id"
);

text_id!(
    /// Login name of an actor known to the host directory.
    ActorName,
    "actor name"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_parse() {
        assert_eq!(ContentId::from_str("0").unwrap(), ContentId::new(0));
        assert_eq!(ContentId::from_str("123456").unwrap().get(), 123456);
        assert!(ContentId::from_str("").is_err());
        assert!(ContentId::from_str("-1").is_err());
        assert!(ContentId::from_str("+1").is_err());
        assert!(ContentId::from_str("12a").is_err());
        assert!(ContentId::from_str(" 12").is_err());
        assert!(ContentId::from_str("99999999999999999999999").is_err());
    }

    #[test]
    fn test_text_ids_reject_blank() {
        assert_eq!(InclusionId::new(""), Err(IdError::Blank("inclusion id")));
        assert_eq!(ActorName::new(" \t"), Err(IdError::Blank("actor name")));
        assert_eq!(InclusionId::new("a b").unwrap().as_str(), "a b");
    }

    #[test]
    fn test_serde_validates() {
        let name: ActorName = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert!(serde_json::from_str::<ActorName>("\"\"").is_err());

        let id: ContentId = serde_json::from_str("7").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }
}
