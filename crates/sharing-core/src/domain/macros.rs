//! Invariant checking macros for the domain layer.
//!
//! - **Zero panic**: the macro returns `Err`, never panics
//! - **Consistent**: every invariant reads as condition plus error value
//!
//! # Example
//!
//! ```rust,ignore
//! use sharing_core::invariant;
//!
//! fn check_period(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
//!     invariant!(
//!         end > start,
//!         DomainError::business_rule("Reservation start date must be before end date")
//!     );
//!     Ok(())
//! }
//! ```

/// Runtime invariant check with custom error.
///
/// Returns `Err(error)` from the enclosing function when `condition` is
/// false. The optional trailing message documents the invariant at the call
/// site and is emitted at debug level when the check fails.
#[macro_export]
macro_rules! invariant {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
    ($condition:expr, $error:expr, $msg:expr) => {
        if !$condition {
            ::tracing::debug!(concat!("invariant violated: ", $msg));
            return Err($error.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::{DomainError, DomainResult};

    fn positive(value: i64) -> DomainResult<i64> {
        invariant!(value > 0, DomainError::business_rule("must be positive"));
        Ok(value)
    }

    fn even(value: i64) -> DomainResult<i64> {
        invariant!(
            value % 2 == 0,
            DomainError::business_rule("must be even"),
            "value must be even"
        );
        Ok(value)
    }

    #[test]
    fn test_invariant_passes() {
        assert_eq!(positive(3), Ok(3));
        assert_eq!(even(4), Ok(4));
    }

    #[test]
    fn test_invariant_returns_error() {
        assert!(matches!(positive(0), Err(DomainError::BusinessRule { .. })));
        assert!(matches!(even(3), Err(DomainError::BusinessRule { .. })));
    }
}
