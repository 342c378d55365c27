//! Passport for trusted background work.
//!
//! A system passport can only be built from a [`TrustedContext`], so every
//! place that elevates privilege names itself in code and in the logs.

use crate::domain::passport::{
    ConversationPassport, ConversationVisaTarget, ItemListingPassport, ItemListingVisaTarget,
    Passport, Principal, ReservationRequestPassport, ReservationRequestVisaTarget, UserPassport,
    UserVisaTarget, Visa,
};
use crate::domain::permissions::{
    ConversationDomainPermissions, ItemListingDomainPermissions,
    ReservationRequestDomainPermissions, SystemPermissions, UserDomainPermissions,
};

/// Capability token for privilege elevation.
///
/// Not `Clone`: one elevation produces one passport.
#[derive(Debug, PartialEq, Eq)]
pub struct TrustedContext {
    reason: String,
}

impl TrustedContext {
    /// Elevate to the trusted context for `reason` (e.g. a job name).
    #[must_use]
    pub fn elevate(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::info!(reason = %reason, "elevating to trusted system context");
        Self { reason }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Passport returning one explicitly supplied permission set for every target.
#[derive(Debug)]
pub struct SystemPassport {
    reason: String,
    permissions: SystemPermissions,
}

impl SystemPassport {
    /// Build a passport that grants `permissions` unconditionally.
    #[must_use]
    pub fn new(context: TrustedContext, permissions: SystemPermissions) -> Self {
        Self {
            reason: context.reason,
            permissions,
        }
    }

    /// Build a passport that grants everything.
    #[must_use]
    pub fn unrestricted(context: TrustedContext) -> Self {
        Self::new(context, SystemPermissions::default())
    }

    fn principal_ref(&self) -> Principal {
        Principal::System {
            reason: self.reason.clone(),
        }
    }
}

impl UserPassport for SystemPassport {
    fn for_user(&self, target: &UserVisaTarget<'_>) -> Visa<UserDomainPermissions> {
        Visa::issue(self.principal_ref(), target.user_id.as_str(), self.permissions.user)
    }
}

impl ItemListingPassport for SystemPassport {
    fn for_item_listing(
        &self,
        target: &ItemListingVisaTarget<'_>,
    ) -> Visa<ItemListingDomainPermissions> {
        Visa::issue(
            self.principal_ref(),
            target.listing_id.as_str(),
            self.permissions.item_listing,
        )
    }
}

impl ConversationPassport for SystemPassport {
    fn for_conversation(
        &self,
        target: &ConversationVisaTarget<'_>,
    ) -> Visa<ConversationDomainPermissions> {
        Visa::issue(
            self.principal_ref(),
            target.conversation_id.as_str(),
            self.permissions.conversation,
        )
    }
}

impl ReservationRequestPassport for SystemPassport {
    fn for_reservation_request(
        &self,
        target: &ReservationRequestVisaTarget<'_>,
    ) -> Visa<ReservationRequestDomainPermissions> {
        Visa::issue(
            self.principal_ref(),
            target.reservation_request_id.as_str(),
            self.permissions.reservation_request,
        )
    }
}

impl Passport for SystemPassport {
    fn principal(&self) -> Principal {
        self.principal_ref()
    }

    fn user(&self) -> &dyn UserPassport {
        self
    }

    fn item_listing(&self) -> &dyn ItemListingPassport {
        self
    }

    fn conversation(&self) -> &dyn ConversationPassport {
        self
    }

    fn reservation_request(&self) -> &dyn ReservationRequestPassport {
        self
    }
}
