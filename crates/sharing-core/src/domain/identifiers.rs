//! Semantic newtypes for domain identifiers
//!
//! # Parse-at-Boundaries Pattern
//!
//! Each identifier type:
//! - Trims whitespace before validation
//! - Validates its input once on construction
//! - Implements serde deserialization through the same validation
//!
//! All identifiers share one rule set: 1-64 ASCII characters drawn from
//! letters, digits, hyphen and underscore. Storage-generated object ids
//! and UUIDs both fit.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// UNIFIED IDENTIFIER ERROR
// ============================================================================

/// Error type for all identifier validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier is empty or contains only whitespace
    #[error("identifier cannot be empty")]
    Empty,

    /// Identifier exceeds maximum length
    #[error("identifier too long: {actual} characters (max {max})")]
    TooLong {
        /// The maximum allowed length
        max: usize,
        /// The actual length provided
        actual: usize,
    },

    /// Identifier contains invalid characters
    #[error("identifier contains invalid characters: {details}")]
    InvalidCharacters {
        /// Human-readable explanation of what's invalid
        details: String,
    },
}

/// Maximum identifier length
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

fn validate_identifier(kind: &str, s: &str) -> Result<(), IdentifierError> {
    if s.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if s.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong {
            max: MAX_IDENTIFIER_LENGTH,
            actual: s.len(),
        });
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(IdentifierError::InvalidCharacters {
            details: format!(
                "{kind} '{s}' must contain only letters, numbers, hyphens, or underscores"
            ),
        });
    }

    Ok(())
}

macro_rules! domain_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate (trims whitespace first)
            ///
            /// # Errors
            ///
            /// Returns `IdentifierError` if the identifier is invalid.
            pub fn parse(s: impl Into<String>) -> Result<Self, IdentifierError> {
                let s = s.into();
                let trimmed = s.trim();
                validate_identifier($kind, trimmed)?;
                Ok(Self(trimmed.to_string()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

domain_identifier!(
    /// Identifier of a personal user or administrator account
    UserId,
    "user id"
);
domain_identifier!(
    /// Identifier of a personal-user or admin role
    RoleId,
    "role id"
);
domain_identifier!(
    /// Identifier of an item listing
    ItemListingId,
    "item listing id"
);
domain_identifier!(
    /// Identifier of a conversation between a sharer and a reserver
    ConversationId,
    "conversation id"
);
domain_identifier!(
    /// Identifier of a reservation request
    ReservationRequestId,
    "reservation request id"
);
domain_identifier!(
    /// Identifier of a message held by the messaging collaborator
    MessageId,
    "message id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = UserId::parse("  user-1  ");
        assert_eq!(id.map(UserId::into_string), Ok("user-1".to_string()));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(ItemListingId::parse("   "), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(matches!(
            ConversationId::parse(long),
            Err(IdentifierError::TooLong { max: 64, actual: 65 })
        ));
    }

    #[test]
    fn test_invalid_characters_rejected() {
        assert!(matches!(
            ReservationRequestId::parse("rr/1"),
            Err(IdentifierError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<RoleId, _> = serde_json::from_str("\"role_admin\"");
        assert!(ok.is_ok());
        let bad: Result<RoleId, _> = serde_json::from_str("\"not valid\"");
        assert!(bad.is_err());
    }
}
