//! Error types for the sharing domain.
//!
//! Errors are split into intentional kinds:
//!
//! - **Authorization**: a Visa denied a mutation, a required relation was
//!   set to nothing, or a creation-only field was touched after creation
//! - **Business rule**: an invalid lifecycle transition
//! - **Validation**: a value object rejected its input
//!
//! Two further kinds cover the boundaries of the domain layer:
//! repository failures surfaced by loaders, and fatal integration event
//! emission failures raised from the save hook.
//!
//! Authorization and business-rule failures are kept distinct even where a
//! single operation checks both a permission and a state guard.

use thiserror::Error;

use crate::domain::identifiers::IdentifierError;
use crate::domain::repository::RepositoryError;

/// Value object validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is empty or whitespace-only
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Value is shorter than the minimum length
    #[error("{field} is too short: {actual} characters (min {min})")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    /// Value exceeds the maximum length
    #[error("{field} is too long: {actual} characters (max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Value contains characters outside the allowed set
    #[error("{field} contains invalid characters: {details}")]
    InvalidCharacters {
        field: &'static str,
        details: String,
    },

    /// Value is well-formed text but not an accepted value
    #[error("invalid {field}: {details}")]
    InvalidValue {
        field: &'static str,
        details: String,
    },

    /// Identifier failed to parse
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),
}

impl ValidationError {
    /// Create an `InvalidValue` error
    #[must_use]
    pub fn invalid_value(field: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            details: details.into(),
        }
    }
}

/// Top-level error for every domain operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Mutation refused by a Visa, or a required relation was missing
    #[error("{message}")]
    Authorization { message: String },

    /// Lifecycle rule violated
    #[error("{message}")]
    BusinessRule { message: String },

    /// Value object rejected its input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence collaborator failed while loading a relation
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Integration event could not be built; the save must abort
    #[error("integration event error: {message}")]
    IntegrationEvent { message: String },
}

impl DomainError {
    /// Create an authorization error with an explicit message.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Authorization error for a Visa that refused to let `field` change.
    #[must_use]
    pub fn permission_denied(field: &str, aggregate: &str) -> Self {
        Self::authorization(format!(
            "You do not have permission to change the {field} of this {aggregate}"
        ))
    }

    /// Authorization error for a required relation set to nothing.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::authorization(format!("{field} cannot be null or undefined"))
    }

    /// Authorization error for a field that is only assignable during creation.
    #[must_use]
    pub fn immutable_after_creation(field: &str, aggregate: &str) -> Self {
        Self::authorization(format!(
            "Cannot change the {field} of this {aggregate} after creation"
        ))
    }

    /// Create a business-rule error.
    #[must_use]
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    /// Create an integration event error.
    #[must_use]
    pub fn integration_event(message: impl Into<String>) -> Self {
        Self::IntegrationEvent {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }

    #[must_use]
    pub const fn is_business_rule(&self) -> bool {
        matches!(self, Self::BusinessRule { .. })
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
