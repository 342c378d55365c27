//! Integration events
//!
//! Facts emitted when an aggregate is persisted, for downstream consumers
//! such as the notifier. Aggregates queue them through
//! `AggregateRoot::add_integration_event`; the external save hook drains
//! the queue once the transaction commits.
//!
//! # Design Principles
//!
//! - **Immutable**: events cannot be modified after creation
//! - **Serializable**: tagged JSON for transport to consumers
//! - **Timestamped**: every event records when it occurred

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identifiers::{ItemListingId, ReservationRequestId, UserId};

/// An integration event queued on an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data")]
pub enum IntegrationEvent {
    /// A reservation request was created and awaits the sharer's answer
    #[serde(rename = "reservation_request_created")]
    ReservationRequestCreated(Box<ReservationRequestCreatedEvent>),
}

impl IntegrationEvent {
    /// Get the timestamp for when this event occurred
    #[must_use]
    pub fn occurred_at(&self) -> &DateTime<Utc> {
        match self {
            Self::ReservationRequestCreated(e) => &e.occurred_at,
        }
    }

    /// Get the event type as a string
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::ReservationRequestCreated(_) => "reservation_request_created",
        }
    }

    /// Serialize to the tagged JSON handed to the notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Create a reservation request created event
    #[must_use]
    pub fn reservation_request_created(
        payload: ReservationRequestCreatedEvent,
    ) -> Self {
        Self::ReservationRequestCreated(Box::new(payload))
    }
}

/// Payload of [`IntegrationEvent::ReservationRequestCreated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequestCreatedEvent {
    pub reservation_request_id: ReservationRequestId,
    pub listing_id: ItemListingId,
    pub reserver_id: UserId,
    pub sharer_id: UserId,
    pub reservation_period_start: DateTime<Utc>,
    pub reservation_period_end: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}
