//! Reservation request aggregate and its lifecycle.
//!
//! # State machine
//!
//! ```text
//! Requested ──accept──▶ Accepted ──close──▶ Closed
//!     │
//!     ├──reject──▶ Rejected ──cancel──▶ Cancelled
//!     │
//!     └──cancel─────────────────────────▶ Cancelled
//! ```
//!
//! `Requested` is only entered by [`ReservationRequestDraft::finalize`].
//! `Cancelled` and `Closed` are terminal.
//!
//! Every transition checks its permission first (authorization error), then
//! the current state (business-rule error). The close flags are different:
//! a missing permission and a wrong state both surface as the same
//! business-rule error.
//!
//! Period, listing and reserver are fixed at creation.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::entity::{require, Aggregate, AggregateRoot};
use crate::domain::events::{IntegrationEvent, ReservationRequestCreatedEvent};
use crate::domain::identifiers::ReservationRequestId;
use crate::domain::passport::{Passport, ReservationRequestVisaTarget};
use crate::domain::permissions::ReservationRequestDomainPermissions;
use crate::domain::repository::{ItemListingRepository, UserRepository};
use crate::domain::values::ReservationPeriod;
use crate::error::{DomainError, DomainResult};

use super::item_listing::{ItemListing, ItemListingProps};
use super::user::{resolve_user_view, UserRecord, UserView};

const RESERVATION_REQUEST: &str = "reservation request";

pub const ACCEPT_VIOLATION: &str = "Can only accept requested reservations";
pub const REJECT_VIOLATION: &str = "Can only reject requested reservations";
pub const CANCEL_VIOLATION: &str = "Cannot cancel reservation in current state";
pub const CLOSE_STATE_VIOLATION: &str = "Can only close accepted reservations";
pub const CLOSE_UNREQUESTED_VIOLATION: &str =
    "Can only close reservation requests if at least one user requested it";
pub const CLOSE_FLAG_VIOLATION: &str = "Cannot close reservation in current state";
pub const INACTIVE_LISTING_VIOLATION: &str =
    "Cannot create reservation request for listing that is not active";
pub const PAST_START_VIOLATION: &str = "Reservation period start date cannot be in the past";

// ============================================================================
// STATE
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ReservationRequestState {
    Requested,
    Accepted,
    Rejected,
    Cancelled,
    Closed,
}

impl ReservationRequestState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Closed)
    }

    /// Whether `self -> to` is an edge of the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Requested, Self::Accepted | Self::Rejected | Self::Cancelled)
                | (Self::Accepted, Self::Closed)
                | (Self::Rejected, Self::Cancelled)
        )
    }
}

// ============================================================================
// PROPS
// ============================================================================

/// Stored reservation request.
///
/// `listing` and `reserver` are snapshots. They are always present on a
/// request created here, but storage may hand back a request whose
/// relations were not populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequestProps {
    pub id: ReservationRequestId,
    pub state: ReservationRequestState,
    pub reservation_period: ReservationPeriod,
    pub close_requested_by_sharer: bool,
    pub close_requested_by_reserver: bool,
    pub listing: Option<ItemListingProps>,
    pub reserver: Option<UserRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// AGGREGATE
// ============================================================================

#[derive(Debug, PartialEq)]
pub struct ReservationRequest {
    root: AggregateRoot<ReservationRequestProps, ReservationRequestDomainPermissions>,
}

impl ReservationRequest {
    #[must_use]
    pub fn new(props: ReservationRequestProps, passport: Arc<dyn Passport>) -> Self {
        let visa = passport
            .reservation_request()
            .for_reservation_request(&ReservationRequestVisaTarget {
                reservation_request_id: &props.id,
                reserver_id: props.reserver.as_ref().map(UserRecord::id),
                sharer_id: props.listing.as_ref().map(|listing| listing.sharer.id()),
            });
        Self {
            root: AggregateRoot::new(props, passport, visa),
        }
    }

    /// Create a request in `Requested`.
    ///
    /// Fields are assigned in order: period start, period end, listing,
    /// reserver. The first failure is returned and nothing is created.
    ///
    /// # Errors
    ///
    /// - business rule: start in the past, start not before end, listing
    ///   not active
    /// - authorization: a required value is missing
    pub fn new_instance(
        passport: Arc<dyn Passport>,
        id: ReservationRequestId,
        reservation_period_start: Option<DateTime<Utc>>,
        reservation_period_end: Option<DateTime<Utc>>,
        listing: Option<ItemListingProps>,
        reserver: Option<UserRecord>,
    ) -> DomainResult<Self> {
        let mut draft = ReservationRequestDraft::new(passport, id);
        draft.set_reservation_period_start(reservation_period_start)?;
        draft.set_reservation_period_end(reservation_period_end)?;
        draft.set_listing(listing)?;
        draft.set_reserver(reserver)?;
        draft.finalize()
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn id(&self) -> &ReservationRequestId {
        &self.root.props().id
    }

    #[must_use]
    pub const fn state(&self) -> ReservationRequestState {
        self.root.props().state
    }

    #[must_use]
    pub const fn reservation_period(&self) -> &ReservationPeriod {
        &self.root.props().reservation_period
    }

    #[must_use]
    pub const fn reservation_period_start(&self) -> DateTime<Utc> {
        self.root.props().reservation_period.start()
    }

    #[must_use]
    pub const fn reservation_period_end(&self) -> DateTime<Utc> {
        self.root.props().reservation_period.end()
    }

    #[must_use]
    pub const fn close_requested_by_sharer(&self) -> bool {
        self.root.props().close_requested_by_sharer
    }

    #[must_use]
    pub const fn close_requested_by_reserver(&self) -> bool {
        self.root.props().close_requested_by_reserver
    }

    /// Snapshot of the reserved listing, if stored.
    #[must_use]
    pub fn listing(&self) -> Option<ItemListing> {
        self.root
            .props()
            .listing
            .clone()
            .map(|props| ItemListing::new(props, Arc::clone(self.root.passport())))
    }

    #[must_use]
    pub fn reserver(&self) -> Option<UserView> {
        self.root
            .props()
            .reserver
            .as_ref()
            .map(|record| resolve_user_view(record, self.root.passport()))
    }

    /// Sharer of the reserved listing, resolved from the listing snapshot.
    #[must_use]
    pub fn sharer(&self) -> Option<UserView> {
        self.root
            .props()
            .listing
            .as_ref()
            .map(|listing| resolve_user_view(&listing.sharer, self.root.passport()))
    }

    #[must_use]
    pub const fn props(&self) -> &ReservationRequestProps {
        self.root.props()
    }

    // ------------------------------------------------------------------------
    // Creation-only fields
    // ------------------------------------------------------------------------

    /// # Errors
    ///
    /// Always fails: the period is fixed at creation.
    pub fn set_reservation_period_start(&mut self, _start: DateTime<Utc>) -> DomainResult<()> {
        Err(DomainError::immutable_after_creation(
            "reservation period start",
            RESERVATION_REQUEST,
        ))
    }

    /// # Errors
    ///
    /// Always fails: the period is fixed at creation.
    pub fn set_reservation_period_end(&mut self, _end: DateTime<Utc>) -> DomainResult<()> {
        Err(DomainError::immutable_after_creation(
            "reservation period end",
            RESERVATION_REQUEST,
        ))
    }

    /// # Errors
    ///
    /// Always fails: the listing is fixed at creation.
    pub fn set_listing(&mut self, _listing: Option<ItemListingProps>) -> DomainResult<()> {
        Err(DomainError::immutable_after_creation("listing", RESERVATION_REQUEST))
    }

    /// # Errors
    ///
    /// Always fails: the reserver is fixed at creation.
    pub fn set_reserver(&mut self, _reserver: Option<UserRecord>) -> DomainResult<()> {
        Err(DomainError::immutable_after_creation("reserver", RESERVATION_REQUEST))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Move to `state` through the matching transition.
    ///
    /// # Errors
    ///
    /// Same as the transition; `Requested` is never a valid target.
    pub fn set_state(&mut self, state: ReservationRequestState) -> DomainResult<()> {
        match state {
            ReservationRequestState::Accepted => self.accept(),
            ReservationRequestState::Rejected => self.reject(),
            ReservationRequestState::Cancelled => self.cancel(),
            ReservationRequestState::Closed => self.close(),
            ReservationRequestState::Requested => Err(DomainError::business_rule(
                "Can only enter the requested state when a reservation request is created",
            )),
        }
    }

    pub fn accept(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", RESERVATION_REQUEST, |p| p.can_accept_request)?;
        self.ensure_transition(ReservationRequestState::Accepted, ACCEPT_VIOLATION)?;
        self.move_to(ReservationRequestState::Accepted);
        Ok(())
    }

    pub fn reject(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", RESERVATION_REQUEST, |p| p.can_reject_request)?;
        self.ensure_transition(ReservationRequestState::Rejected, REJECT_VIOLATION)?;
        self.move_to(ReservationRequestState::Rejected);
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", RESERVATION_REQUEST, |p| p.can_cancel_request)?;
        self.ensure_transition(ReservationRequestState::Cancelled, CANCEL_VIOLATION)?;
        self.move_to(ReservationRequestState::Cancelled);
        Ok(())
    }

    pub fn close(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", RESERVATION_REQUEST, |p| p.can_close_request)?;
        self.ensure_transition(ReservationRequestState::Closed, CLOSE_STATE_VIOLATION)?;
        crate::invariant!(
            self.close_requested_by_sharer() || self.close_requested_by_reserver(),
            DomainError::business_rule(CLOSE_UNREQUESTED_VIOLATION)
        );
        self.move_to(ReservationRequestState::Closed);
        Ok(())
    }

    pub fn set_close_requested_by_sharer(&mut self, requested: bool) -> DomainResult<()> {
        self.ensure_close_flag_settable()?;
        self.root.props_mut().close_requested_by_sharer = requested;
        Ok(())
    }

    pub fn set_close_requested_by_reserver(&mut self, requested: bool) -> DomainResult<()> {
        self.ensure_close_flag_settable()?;
        self.root.props_mut().close_requested_by_reserver = requested;
        Ok(())
    }

    fn ensure_close_flag_settable(&self) -> DomainResult<()> {
        let permitted = self.root.allows(|p| p.can_close_request);
        crate::invariant!(
            permitted && self.state() == ReservationRequestState::Accepted,
            DomainError::business_rule(CLOSE_FLAG_VIOLATION)
        );
        Ok(())
    }

    /// Fail with `violation` unless `to` is an edge out of the current state.
    fn ensure_transition(&self, to: ReservationRequestState, violation: &str) -> DomainResult<()> {
        crate::invariant!(
            self.state().can_transition_to(to),
            DomainError::business_rule(violation)
        );
        Ok(())
    }

    fn move_to(&mut self, to: ReservationRequestState) {
        let from = self.state();
        self.root.props_mut().state = to;
        tracing::debug!(
            reservation_request_id = %self.id(),
            from = %from,
            to = %to,
            "reservation request state changed"
        );
    }

    // ------------------------------------------------------------------------
    // Loaders
    // ------------------------------------------------------------------------

    /// # Errors
    ///
    /// Fails when no listing is stored on the request, or with the
    /// repository error.
    pub async fn load_listing(
        &self,
        listings: &dyn ItemListingRepository,
    ) -> DomainResult<ItemListing> {
        let listing_id = &require("listing", self.root.props().listing.as_ref())?.id;
        let props = listings.get_by_id(listing_id).await?;
        Ok(ItemListing::new(props, Arc::clone(self.root.passport())))
    }

    /// # Errors
    ///
    /// Fails when no reserver is stored on the request, or with the
    /// repository error.
    pub async fn load_reserver(&self, users: &dyn UserRepository) -> DomainResult<UserView> {
        let reserver = require("reserver", self.root.props().reserver.as_ref())?;
        let record = users.get_by_id(reserver.id()).await?;
        Ok(resolve_user_view(&record, self.root.passport()))
    }

    /// Load the listing's sharer, found through the listing snapshot.
    ///
    /// # Errors
    ///
    /// Fails when no listing is stored on the request, or with the
    /// repository error.
    pub async fn load_sharer(&self, users: &dyn UserRepository) -> DomainResult<UserView> {
        let listing = require("listing", self.root.props().listing.as_ref())?;
        let record = users.get_by_id(listing.sharer.id()).await?;
        Ok(resolve_user_view(&record, self.root.passport()))
    }

    fn created_event(&self) -> DomainResult<IntegrationEvent> {
        let props = self.root.props();
        let missing = |what: &str| {
            DomainError::integration_event(format!(
                "reservation request {} has no {what}; cannot emit creation event",
                props.id
            ))
        };
        let listing = props.listing.as_ref().ok_or_else(|| missing("listing"))?;
        let reserver = props.reserver.as_ref().ok_or_else(|| missing("reserver"))?;

        Ok(IntegrationEvent::reservation_request_created(
            ReservationRequestCreatedEvent {
                reservation_request_id: props.id.clone(),
                listing_id: listing.id.clone(),
                reserver_id: reserver.id().clone(),
                sharer_id: listing.sharer.id().clone(),
                reservation_period_start: props.reservation_period.start(),
                reservation_period_end: props.reservation_period.end(),
                occurred_at: Utc::now(),
            },
        ))
    }
}

impl Aggregate for ReservationRequest {
    /// Queue `ReservationRequestCreated` when a modified request is saved
    /// in `Requested`.
    fn on_save(&mut self, is_modified: bool) -> DomainResult<()> {
        if is_modified && self.state() == ReservationRequestState::Requested {
            let event = self.created_event()?;
            self.root.add_integration_event(event);
        }
        Ok(())
    }

    fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        self.root.take_integration_events()
    }
}

// ============================================================================
// DRAFT
// ============================================================================

/// Creation phase of a [`ReservationRequest`].
///
/// Setters run the creation-time checks but never consult the Visa.
#[derive(Debug)]
pub struct ReservationRequestDraft {
    passport: Arc<dyn Passport>,
    id: ReservationRequestId,
    reservation_period_start: Option<DateTime<Utc>>,
    reservation_period_end: Option<DateTime<Utc>>,
    listing: Option<ItemListingProps>,
    reserver: Option<UserRecord>,
}

impl ReservationRequestDraft {
    #[must_use]
    pub fn new(passport: Arc<dyn Passport>, id: ReservationRequestId) -> Self {
        Self {
            passport,
            id,
            reservation_period_start: None,
            reservation_period_end: None,
            listing: None,
            reserver: None,
        }
    }

    /// Start must not be in the past, and must precede any end already set.
    pub fn set_reservation_period_start(&mut self, start: Option<DateTime<Utc>>) -> DomainResult<()> {
        let start = require("reservation period start", start)?;
        crate::invariant!(
            start >= Utc::now(),
            DomainError::business_rule(PAST_START_VIOLATION)
        );
        if let Some(end) = self.reservation_period_end {
            ReservationPeriod::new(start, end)?;
        }
        self.reservation_period_start = Some(start);
        Ok(())
    }

    /// End must be strictly after any start already set.
    pub fn set_reservation_period_end(&mut self, end: Option<DateTime<Utc>>) -> DomainResult<()> {
        let end = require("reservation period end", end)?;
        if let Some(start) = self.reservation_period_start {
            ReservationPeriod::new(start, end)?;
        }
        self.reservation_period_end = Some(end);
        Ok(())
    }

    pub fn set_listing(&mut self, listing: Option<ItemListingProps>) -> DomainResult<()> {
        let listing = require("listing", listing)?;
        crate::invariant!(
            listing.is_active(),
            DomainError::business_rule(INACTIVE_LISTING_VIOLATION)
        );
        self.listing = Some(listing);
        Ok(())
    }

    pub fn set_reserver(&mut self, reserver: Option<UserRecord>) -> DomainResult<()> {
        self.reserver = Some(require("reserver", reserver)?);
        Ok(())
    }

    /// Leave the creation phase. The state is set last, to `Requested`.
    ///
    /// # Errors
    ///
    /// Fails with the "cannot be null" error for a field never set.
    pub fn finalize(self) -> DomainResult<ReservationRequest> {
        let period = ReservationPeriod::new(
            require("reservation period start", self.reservation_period_start)?,
            require("reservation period end", self.reservation_period_end)?,
        )?;
        let listing = require("listing", self.listing)?;
        let reserver = require("reserver", self.reserver)?;
        let now = Utc::now();

        let props = ReservationRequestProps {
            id: self.id,
            state: ReservationRequestState::Requested,
            reservation_period: period,
            close_requested_by_sharer: false,
            close_requested_by_reserver: false,
            listing: Some(listing),
            reserver: Some(reserver),
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(reservation_request_id = %props.id, "reservation request created");
        Ok(ReservationRequest::new(props, self.passport))
    }
}
