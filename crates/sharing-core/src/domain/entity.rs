//! Guarded aggregate root shared by every aggregate.
//!
//! An [`AggregateRoot`] owns the persisted property bag, the passport it was
//! built with, the Visa issued for it at construction, and the queue of
//! integration events raised since the last save.
//!
//! # Mutation contract
//!
//! Every guarded setter on a committed aggregate runs, in order:
//!
//! 1. [`AggregateRoot::guard`]: the Visa must allow the change, otherwise an
//!    authorization error names the field and the aggregate
//! 2. [`require`]: a required relation must be present
//! 3. the assignment itself
//!
//! Creation goes through the aggregate's `…Draft` type instead, which skips
//! step 1 only. Once `finalize()` has returned there is no way back into the
//! creation phase.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use crate::domain::events::IntegrationEvent;
use crate::domain::passport::{Passport, Visa};
use crate::domain::permissions::DomainPermissions;
use crate::error::{DomainError, DomainResult};

/// Props, passport, Visa and pending integration events of one aggregate.
pub struct AggregateRoot<P, V> {
    props: P,
    passport: Arc<dyn Passport>,
    visa: Visa<V>,
    integration_events: Vec<IntegrationEvent>,
}

impl<P, V: DomainPermissions> AggregateRoot<P, V> {
    pub(crate) fn new(props: P, passport: Arc<dyn Passport>, visa: Visa<V>) -> Self {
        Self {
            props,
            passport,
            visa,
            integration_events: Vec::new(),
        }
    }

    /// Fail with a permission error for `field` unless the Visa allows it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Authorization` when `predicate` is false.
    pub(crate) fn guard<F>(&self, field: &str, aggregate: &str, predicate: F) -> DomainResult<()>
    where
        F: FnOnce(&V) -> bool,
    {
        if self.visa.evaluate(predicate) {
            Ok(())
        } else {
            Err(DomainError::permission_denied(field, aggregate))
        }
    }

    /// Run a predicate against the Visa without turning denial into an error.
    pub(crate) fn allows<F>(&self, predicate: F) -> bool
    where
        F: FnOnce(&V) -> bool,
    {
        self.visa.evaluate(predicate)
    }

    #[must_use]
    pub const fn props(&self) -> &P {
        &self.props
    }

    pub(crate) fn props_mut(&mut self) -> &mut P {
        &mut self.props
    }

    #[must_use]
    pub fn into_props(self) -> P {
        self.props
    }

    #[must_use]
    pub const fn passport(&self) -> &Arc<dyn Passport> {
        &self.passport
    }

    #[must_use]
    pub const fn visa(&self) -> &Visa<V> {
        &self.visa
    }

    pub(crate) fn add_integration_event(&mut self, event: IntegrationEvent) {
        tracing::debug!(event_type = event.event_type(), "queued integration event");
        self.integration_events.push(event);
    }

    #[must_use]
    pub fn pending_integration_events(&self) -> &[IntegrationEvent] {
        &self.integration_events
    }

    pub fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        std::mem::take(&mut self.integration_events)
    }
}

impl<P: PartialEq, V: PartialEq> PartialEq for AggregateRoot<P, V> {
    fn eq(&self, other: &Self) -> bool {
        self.props == other.props
            && self.visa == other.visa
            && self.integration_events == other.integration_events
    }
}

impl<P: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for AggregateRoot<P, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateRoot")
            .field("props", &self.props)
            .field("principal", &self.passport.principal())
            .field("visa", &self.visa)
            .field("integration_events", &self.integration_events.len())
            .finish()
    }
}

/// Persistence hooks implemented by every aggregate.
pub trait Aggregate {
    /// Called by the unit of work inside its transaction, before the props
    /// are written.
    ///
    /// # Errors
    ///
    /// An error aborts the save.
    fn on_save(&mut self, _is_modified: bool) -> DomainResult<()> {
        Ok(())
    }

    fn take_integration_events(&mut self) -> Vec<IntegrationEvent>;
}

/// Unwrap a required relation or fail with the "cannot be null" error.
///
/// # Errors
///
/// Returns `DomainError::Authorization` when `value` is `None`.
pub fn require<T>(field: &str, value: Option<T>) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::required(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifiers::ConversationId;
    use crate::domain::passport::{ConversationVisaTarget, SystemPassport, TrustedContext};
    use crate::domain::permissions::{ConversationDomainPermissions, SystemPermissions};

    fn root(can_manage: bool) -> Result<AggregateRoot<u32, ConversationDomainPermissions>, Box<dyn std::error::Error>> {
        let passport: Arc<dyn Passport> = Arc::new(SystemPassport::new(
            TrustedContext::elevate("entity-test"),
            SystemPermissions {
                conversation: ConversationDomainPermissions {
                    can_manage_conversation: can_manage,
                    ..ConversationDomainPermissions::default()
                },
                ..SystemPermissions::default()
            },
        ));
        let id = ConversationId::parse("conv-1")?;
        let visa = passport.conversation().for_conversation(&ConversationVisaTarget {
            conversation_id: &id,
            sharer_id: None,
            reserver_id: None,
        });
        Ok(AggregateRoot::new(7, passport, visa))
    }

    #[test]
    fn test_guard_passes_when_visa_allows() -> Result<(), Box<dyn std::error::Error>> {
        let root = root(true)?;
        assert!(root.guard("sharer", "conversation", |p| p.can_manage_conversation).is_ok());
        Ok(())
    }

    #[test]
    fn test_guard_names_field_and_aggregate() -> Result<(), Box<dyn std::error::Error>> {
        let root = root(false)?;
        let err = root
            .guard("sharer", "conversation", |p| p.can_manage_conversation)
            .err();
        assert_eq!(
            err,
            Some(DomainError::permission_denied("sharer", "conversation"))
        );
        Ok(())
    }

    #[test]
    fn test_require_rejects_none() {
        assert_eq!(require("listing", Some(3)), Ok(3));
        assert_eq!(
            require::<u8>("listing", None),
            Err(DomainError::required("listing"))
        );
    }
}
