//! Validated identifier types.
//!
//! Every identifier that crosses a service boundary is an opaque, non-empty
//! string. The engine only compares them for equality and formats them into
//! URLs or descriptions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The identifier contains a character that would break a correlation tag.
    #[error("{field} cannot contain '{character}'")]
    ForbiddenCharacter {
        field: &'static str,
        character: char,
    },

    /// A time window whose end is not after its start.
    #[error("window end {end} must be after start {start}")]
    EmptyWindow { start: String, end: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
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

/// A validated local time entry identifier.
///
/// Entry IDs are embedded verbatim into correlation tags, so a closing bracket
/// is rejected: `[cid:a]b]` would never match its own entry again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new entry ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "entry ID" });
        }
        if id.contains(']') {
            return Err(ValidationError::ForbiddenCharacter {
                field: "entry ID",
                character: ']',
            });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

define_string_id!(
    /// Identifier of a record in the remote worklog store.
    RemoteId, "remote ID"
);

define_string_id!(
    /// Identifier of an issue in the external issue tracker.
    IssueId, "issue ID"
);

define_string_id!(
    /// Account identifier of the worklog author.
    AccountId, "account ID"
);

define_string_id!(
    /// Time tracker workspace identifier.
    WorkspaceId, "workspace ID"
);

define_string_id!(
    /// Time tracker user identifier.
    UserId, "user ID"
);
