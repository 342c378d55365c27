//! Value objects for aggregate fields.
//!
//! Each value object trims its input, checks length and character set, and
//! hands back the normalized value. Failures are `ValidationError`s; the
//! aggregates never see an unvalidated string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, ValidationError};

fn normalize_text(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let actual = trimmed.chars().count();
    if actual < min {
        return Err(ValidationError::TooShort { field, min, actual });
    }
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }

    Ok(trimmed.to_string())
}

macro_rules! text_value {
    ($(#[$meta:meta])* $name:ident, $field:literal, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const MIN_LENGTH: usize = $min;
            pub const MAX_LENGTH: usize = $max;

            /// Validate and normalize the input.
            ///
            /// # Errors
            ///
            /// Returns `ValidationError` when the trimmed value is empty or
            /// outside the length bounds.
            pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
                normalize_text($field, value.as_ref(), Self::MIN_LENGTH, Self::MAX_LENGTH)
                    .map(Self)
            }

            #[must_use]
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
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

text_value!(
    /// Listing title
    Title, "title", 5, 100
);
text_value!(
    /// Listing description
    Description, "description", 1, 2000
);
text_value!(Category, "category", 1, 255);
text_value!(Location, "location", 1, 255);
text_value!(
    /// First or last name on an account profile
    PersonName, "name", 1, 100
);
text_value!(RoleName, "role name", 1, 50);

// ============================================================================
// USERNAME / EMAIL
// ============================================================================

/// Account username: 3-50 characters of letters, digits, `.`, `-`, `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 50;

    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = normalize_text("username", value.as_ref(), Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(ValidationError::InvalidCharacters {
                field: "username",
                details: format!("'{normalized}' may only contain letters, numbers, '.', '-' or '_'"),
            });
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Account email address, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub const MAX_LENGTH: usize = 254;

    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = normalize_text("email", value.as_ref(), 3, Self::MAX_LENGTH)?;

        if normalized.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidCharacters {
                field: "email",
                details: "must not contain whitespace".to_string(),
            });
        }

        let well_formed = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && domain.contains('.') && !domain.contains('@')
            });
        if !well_formed {
            return Err(ValidationError::invalid_value(
                "email",
                format!("'{normalized}' is not an email address"),
            ));
        }

        Ok(Self(normalized.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Identifier of a thread in the external messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessagingConversationId(String);

impl MessagingConversationId {
    pub const MAX_LENGTH: usize = 255;

    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized =
            normalize_text("messaging conversation id", value.as_ref(), 1, Self::MAX_LENGTH)?;
        if normalized.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidCharacters {
                field: "messaging conversation id",
                details: "must not contain whitespace".to_string(),
            });
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessagingConversationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessagingConversationId> for String {
    fn from(value: MessagingConversationId) -> Self {
        value.0
    }
}

// ============================================================================
// LISTING STATE
// ============================================================================

/// Listing state, stored as a validated string.
///
/// The accepted spellings are fixed but the type is not a closed enum:
/// storage may carry any of them and transitions on `ItemListing` are the
/// only way to move between them after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingStateValue(String);

impl ListingStateValue {
    pub const ACTIVE: &'static str = "Active";
    pub const PAUSED: &'static str = "Paused";
    pub const CANCELLED: &'static str = "Cancelled";
    pub const DRAFTED: &'static str = "Drafted";
    pub const EXPIRED: &'static str = "Expired";
    pub const BLOCKED: &'static str = "Blocked";
    pub const APPEAL_REQUESTED: &'static str = "Appeal Requested";

    const ALLOWED: [&'static str; 7] = [
        Self::ACTIVE,
        Self::PAUSED,
        Self::CANCELLED,
        Self::DRAFTED,
        Self::EXPIRED,
        Self::BLOCKED,
        Self::APPEAL_REQUESTED,
    ];

    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = normalize_text("listing state", value.as_ref(), 1, 32)?;
        Self::ALLOWED
            .iter()
            .find(|allowed| allowed.eq_ignore_ascii_case(&normalized))
            .map(|allowed| Self((*allowed).to_string()))
            .ok_or_else(|| {
                ValidationError::invalid_value(
                    "listing state",
                    format!("'{normalized}' is not one of {}", Self::ALLOWED.join(", ")),
                )
            })
    }

    pub(crate) fn known(value: &'static str) -> Self {
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is(&self, state: &str) -> bool {
        self.0 == state
    }
}

impl TryFrom<String> for ListingStateValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListingStateValue> for String {
    fn from(value: ListingStateValue) -> Self {
        value.0
    }
}

impl std::fmt::Display for ListingStateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RESERVATION PERIOD
// ============================================================================

/// A half-open `[start, end)` period with `end` strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawReservationPeriod")]
pub struct ReservationPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReservationPeriod {
    pub const ORDER_VIOLATION: &'static str = "Reservation start date must be before end date";

    /// # Errors
    ///
    /// Returns a business-rule error when `end` is not after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        crate::invariant!(
            end > start,
            DomainError::business_rule(Self::ORDER_VIOLATION),
            "reservation period end must be after start"
        );
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether two periods share any instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Deserialize)]
struct RawReservationPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawReservationPeriod> for ReservationPeriod {
    type Error = DomainError;

    fn try_from(raw: RawReservationPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_title_trims_and_bounds() {
        assert_eq!(
            Title::new("  Cordless drill  ").map(String::from),
            Ok("Cordless drill".to_string())
        );
        assert!(matches!(Title::new("   "), Err(ValidationError::Empty { .. })));
        assert!(matches!(Title::new("Saw"), Err(ValidationError::TooShort { .. })));
        assert!(matches!(
            Title::new("x".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn test_email_normalizes_case() {
        assert_eq!(
            Email::new("Alice@Example.com").map(String::from),
            Ok("alice@example.com".to_string())
        );
        assert!(Email::new("not-an-email").is_err());
        assert!(Email::new("a b@example.com").is_err());
    }

    #[test]
    fn test_username_character_set() {
        assert!(Username::new("alice.smith_1").is_ok());
        assert!(matches!(
            Username::new("alice smith"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_listing_state_accepts_known_values_case_insensitively() {
        let state = ListingStateValue::new("paused");
        assert_eq!(state.map(String::from), Ok("Paused".to_string()));
        assert!(ListingStateValue::new("Archived").is_err());
    }

    #[test]
    fn test_reservation_period_requires_order() {
        let start = Utc::now();
        assert!(ReservationPeriod::new(start, start).is_err());
        assert!(ReservationPeriod::new(start, start - Duration::days(1)).is_err());
        assert!(ReservationPeriod::new(start, start + Duration::days(1)).is_ok());
    }

    #[test]
    fn test_reservation_period_overlap_is_half_open() -> DomainResult<()> {
        let t0 = Utc::now();
        let first = ReservationPeriod::new(t0, t0 + Duration::days(2))?;
        let touching = ReservationPeriod::new(t0 + Duration::days(2), t0 + Duration::days(3))?;
        let inside = ReservationPeriod::new(t0 + Duration::days(1), t0 + Duration::days(5))?;

        assert!(!first.overlaps(&touching));
        assert!(first.overlaps(&inside));
        assert!(inside.overlaps(&first));
        Ok(())
    }
}
