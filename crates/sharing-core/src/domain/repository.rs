//! Repository trait interfaces for the persistence collaborator.
//!
//! Repositories deal in persisted property bags (`…Props`, `UserRecord`),
//! never in aggregates: the caller wraps what it loads with its own
//! passport. Implementations live outside this crate.
//!
//! The domain layer calls these traits only from aggregate loaders
//! (`load_sharer`, `load_listing`, ...). Failures propagate untouched; retry
//! and timeout policy belong to the implementation.
//!
//! # Error Conditions
//!
//! - `NotFound`: requested entity doesn't exist
//! - `Conflict`: save would violate a constraint
//! - `StorageError`: underlying storage failure

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{
    conversation::ConversationProps, item_listing::ItemListingProps,
    reservation_request::ReservationRequestProps, role::AdminRoleProps,
    role::PersonalUserRoleProps, user::UserRecord,
};
use crate::domain::entity::Aggregate;
use crate::domain::events::IntegrationEvent;
use crate::domain::identifiers::{
    ConversationId, ItemListingId, MessageId, ReservationRequestId, RoleId, UserId,
};
use crate::domain::values::{MessagingConversationId, ReservationPeriod};
use crate::error::DomainResult;

// ============================================================================
// SHARED ERROR TYPES
// ============================================================================

/// Common errors across all repository operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Entity not found in repository
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Conflict with existing data (duplicate, constraint violation)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying storage failure
    #[error("storage error: {0}")]
    StorageError(String),
}

impl RepositoryError {
    /// Create a not found error
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} '{id}'"))
    }

    /// Create a conflict error
    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    /// Create a storage error
    #[must_use]
    pub fn storage_error(reason: impl Into<String>) -> Self {
        Self::StorageError(reason.into())
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// ============================================================================
// USERS & ROLES
// ============================================================================

/// Personal-user and administrator accounts, stored as one tagged record.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> RepositoryResult<UserRecord>;

    async fn save(&self, record: &UserRecord) -> RepositoryResult<()>;
}

/// Personal-user and admin roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn get_personal_user_role_by_id(
        &self,
        id: &RoleId,
    ) -> RepositoryResult<PersonalUserRoleProps>;

    async fn get_admin_role_by_id(&self, id: &RoleId) -> RepositoryResult<AdminRoleProps>;
}

// ============================================================================
// LISTINGS
// ============================================================================

#[async_trait]
pub trait ItemListingRepository: Send + Sync {
    async fn get_by_id(&self, id: &ItemListingId) -> RepositoryResult<ItemListingProps>;

    async fn get_by_sharer_id(&self, sharer_id: &UserId) -> RepositoryResult<Vec<ItemListingProps>>;

    async fn save(&self, props: &ItemListingProps) -> RepositoryResult<()>;
}

// ============================================================================
// CONVERSATIONS & MESSAGES
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn get_by_id(&self, id: &ConversationId) -> RepositoryResult<ConversationProps>;

    /// Conversations whose `expires_at` has passed, oldest first, at most `limit`.
    async fn get_expired(&self, limit: usize) -> RepositoryResult<Vec<ConversationProps>>;

    async fn save(&self, props: &ConversationProps) -> RepositoryResult<()>;
}

/// A message held by the external messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Read access to the external messaging service.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn get_messages(
        &self,
        messaging_conversation_id: &MessagingConversationId,
    ) -> RepositoryResult<Vec<Message>>;
}

// ============================================================================
// RESERVATION REQUESTS
// ============================================================================

#[async_trait]
pub trait ReservationRequestRepository: Send + Sync {
    async fn get_by_id(
        &self,
        id: &ReservationRequestId,
    ) -> RepositoryResult<ReservationRequestProps>;

    async fn get_by_listing_id(
        &self,
        listing_id: &ItemListingId,
    ) -> RepositoryResult<Vec<ReservationRequestProps>>;

    /// Requests by `reserver_id` that are neither closed nor cancelled.
    async fn get_active_by_reserver_id(
        &self,
        reserver_id: &UserId,
    ) -> RepositoryResult<Vec<ReservationRequestProps>>;

    /// Requests for `listing_id` whose period overlaps `period`.
    async fn query_overlap_by_listing_id_and_reservation_period(
        &self,
        listing_id: &ItemListingId,
        period: &ReservationPeriod,
    ) -> RepositoryResult<Vec<ReservationRequestProps>>;

    async fn save(&self, props: &ReservationRequestProps) -> RepositoryResult<()>;
}

// ============================================================================
// SAVE HOOK
// ============================================================================

/// Run the aggregate's save hook and drain its integration events.
///
/// A unit of work calls this inside its transaction, persists the props,
/// then publishes the returned events after commit. An error means the
/// whole save must be discarded.
pub fn prepare_for_save<A: Aggregate>(
    aggregate: &mut A,
    is_modified: bool,
) -> DomainResult<Vec<IntegrationEvent>> {
    aggregate.on_save(is_modified)?;
    Ok(aggregate.take_integration_events())
}
