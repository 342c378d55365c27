//! # Passports
//!
//! A [`Passport`] is handed to every aggregate constructor. It is an
//! aggregate of context passports, one per bounded context, each of which
//! issues a [`Visa`] for a target aggregate on behalf of the actor captured
//! when the passport was built.
//!
//! Three families exist:
//!
//! - [`SystemPassport`] - trusted background work, built only from a
//!   [`TrustedContext`] token, returns its supplied permissions for every
//!   target
//! - [`PersonalUserPassport`] - marketplace members; relationship-based
//!   grants combined with the member's role table
//! - [`AdminUserPassport`] - administrators; grants from the admin role
//!   table
//!
//! Permission computation reads the actor captured at construction and the
//! target handed to the context passport, nothing else.
//!
//! ```rust,ignore
//! let passport: Arc<dyn Passport> = Arc::new(PersonalUserPassport::new(&member));
//! let visa = passport
//!     .reservation_request()
//!     .for_reservation_request(&ReservationRequestVisaTarget { .. });
//! assert!(visa.evaluate(|p| p.can_cancel_request));
//! ```

pub mod admin_user;
pub mod personal_user;
pub mod system;
pub mod visa;

use crate::domain::identifiers::{ConversationId, ItemListingId, ReservationRequestId, UserId};
use crate::domain::permissions::{
    ConversationDomainPermissions, ItemListingDomainPermissions,
    ReservationRequestDomainPermissions, UserDomainPermissions,
};

pub use admin_user::AdminUserPassport;
pub use personal_user::PersonalUserPassport;
pub use system::{SystemPassport, TrustedContext};
pub use visa::{Principal, Visa, VisaSubject};

// ============================================================================
// VISA TARGETS
// ============================================================================

/// A user account a Visa is requested for.
#[derive(Debug, Clone, Copy)]
pub struct UserVisaTarget<'a> {
    pub user_id: &'a UserId,
}

/// An item listing a Visa is requested for.
#[derive(Debug, Clone, Copy)]
pub struct ItemListingVisaTarget<'a> {
    pub listing_id: &'a ItemListingId,
    pub sharer_id: Option<&'a UserId>,
}

/// A conversation a Visa is requested for.
#[derive(Debug, Clone, Copy)]
pub struct ConversationVisaTarget<'a> {
    pub conversation_id: &'a ConversationId,
    pub sharer_id: Option<&'a UserId>,
    pub reserver_id: Option<&'a UserId>,
}

/// A reservation request a Visa is requested for.
///
/// `sharer_id` is the owner of the reserved listing.
#[derive(Debug, Clone, Copy)]
pub struct ReservationRequestVisaTarget<'a> {
    pub reservation_request_id: &'a ReservationRequestId,
    pub reserver_id: Option<&'a UserId>,
    pub sharer_id: Option<&'a UserId>,
}

// ============================================================================
// CONTEXT PASSPORTS
// ============================================================================

/// Issues Visas over user accounts.
pub trait UserPassport: Send + Sync {
    fn for_user(&self, target: &UserVisaTarget<'_>) -> Visa<UserDomainPermissions>;
}

/// Issues Visas over item listings.
pub trait ItemListingPassport: Send + Sync {
    fn for_item_listing(
        &self,
        target: &ItemListingVisaTarget<'_>,
    ) -> Visa<ItemListingDomainPermissions>;
}

/// Issues Visas over conversations.
pub trait ConversationPassport: Send + Sync {
    fn for_conversation(
        &self,
        target: &ConversationVisaTarget<'_>,
    ) -> Visa<ConversationDomainPermissions>;
}

/// Issues Visas over reservation requests.
pub trait ReservationRequestPassport: Send + Sync {
    fn for_reservation_request(
        &self,
        target: &ReservationRequestVisaTarget<'_>,
    ) -> Visa<ReservationRequestDomainPermissions>;
}

/// The actor-scoped object handed to every aggregate.
pub trait Passport: std::fmt::Debug + Send + Sync {
    /// Identity the passport acts for
    fn principal(&self) -> Principal;

    fn user(&self) -> &dyn UserPassport;

    fn item_listing(&self) -> &dyn ItemListingPassport;

    fn conversation(&self) -> &dyn ConversationPassport;

    fn reservation_request(&self) -> &dyn ReservationRequestPassport;
}

/// Whether `actor` is `candidate`; `None` never matches.
pub(crate) fn is_same_user(actor: &UserId, candidate: Option<&UserId>) -> bool {
    candidate.is_some_and(|id| id == actor)
}
