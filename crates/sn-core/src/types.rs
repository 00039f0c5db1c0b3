//! Core identifier types with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated note identifier.
    ///
    /// A note is a named, owned container of stamps. Its ID never changes over
    /// the note's lifetime; uniqueness is the allocating store's concern.
    NoteId, "note ID"
);

define_string_id!(
    /// A validated owner (user) identifier.
    OwnerId, "owner ID"
);

define_string_id!(
    /// A validated shared-note token.
    ///
    /// An opaque token that lets other users subscribe to read (not own)
    /// a note. A note's shared ID may be added, changed, or removed
    /// independently of its content.
    SharedId, "shared ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_id_rejects_empty() {
        assert!(NoteId::new("").is_err());
        assert!(NoteId::new("note-1").is_ok());
    }

    #[test]
    fn owner_id_rejects_empty() {
        assert!(OwnerId::new("").is_err());
        assert!(OwnerId::new("user-a").is_ok());
    }

    #[test]
    fn note_id_serde_roundtrip() {
        let id = NoteId::new("note-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"note-123\"");
        let parsed: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn shared_id_serde_rejects_empty() {
        let result: Result<SharedId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn shared_id_as_ref() {
        let id = SharedId::new("abc").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "abc");
    }
}
