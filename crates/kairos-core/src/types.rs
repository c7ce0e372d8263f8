//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid priority value.
    #[error("invalid priority: {value} (expected Low, Medium or High)")]
    InvalidPriority { value: String },

    /// Invalid hex color value.
    #[error("invalid color: {value} (expected #RRGGBB)")]
    InvalidColor { value: String },
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
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Generates a fresh random ID.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the leading characters used for display.
            pub fn short(&self) -> &str {
                let end = self
                    .0
                    .char_indices()
                    .nth(SHORT_ID_LEN)
                    .map_or(self.0.len(), |(index, _)| index);
                &self.0[..end]
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

/// Number of characters shown for abbreviated IDs.
pub const SHORT_ID_LEN: usize = 8;

define_string_id!(
    /// A validated task identifier.
    ///
    /// Task IDs are opaque non-empty strings, normally random UUIDs.
    TaskId, "task ID"
);

define_string_id!(
    /// A validated category preference identifier.
    ///
    /// Built-in categories use their lower-case name (e.g. `work`); user
    /// categories get a random UUID.
    CategoryId, "category ID"
);

/// Checks that a color is a `#RRGGBB` hex string.
pub fn validate_hex_color(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidColor {
            value: value.to_string(),
        })
    }
}
