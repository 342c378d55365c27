//! Conversation aggregate.
//!
//! A conversation links a sharer, a reserver and a listing to a thread in
//! the external messaging service. Every setter is guarded by
//! `can_manage_conversation`. Expired conversations are removed by an
//! external TTL job driven by `expires_at`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{require, Aggregate, AggregateRoot};
use crate::domain::events::IntegrationEvent;
use crate::domain::identifiers::ConversationId;
use crate::domain::passport::{ConversationVisaTarget, Passport};
use crate::domain::permissions::ConversationDomainPermissions;
use crate::domain::repository::{ItemListingRepository, Message, MessageRepository, UserRepository};
use crate::domain::values::MessagingConversationId;
use crate::error::DomainResult;

use super::item_listing::{ItemListing, ItemListingProps};
use super::user::{resolve_user_view, UserRecord, UserView};

const CONVERSATION: &str = "conversation";

/// Six months, counted as 180 days of 86 400 000 ms.
pub const DEFAULT_RETENTION_MILLIS: i64 = 180 * 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationProps {
    pub id: ConversationId,
    pub sharer: UserRecord,
    pub reserver: UserRecord,
    pub listing: ItemListingProps,
    pub messaging_conversation_id: MessagingConversationId,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub struct Conversation {
    root: AggregateRoot<ConversationProps, ConversationDomainPermissions>,
}

impl Conversation {
    #[must_use]
    pub fn new(props: ConversationProps, passport: Arc<dyn Passport>) -> Self {
        let visa = passport.conversation().for_conversation(&ConversationVisaTarget {
            conversation_id: &props.id,
            sharer_id: Some(props.sharer.id()),
            reserver_id: Some(props.reserver.id()),
        });
        Self {
            root: AggregateRoot::new(props, passport, visa),
        }
    }

    /// # Errors
    ///
    /// Fails with the "cannot be null" error for a missing relation.
    pub fn new_instance(
        passport: Arc<dyn Passport>,
        id: ConversationId,
        sharer: Option<UserRecord>,
        reserver: Option<UserRecord>,
        listing: Option<ItemListingProps>,
        messaging_conversation_id: MessagingConversationId,
    ) -> DomainResult<Self> {
        let mut draft = ConversationDraft::new(passport, id, messaging_conversation_id);
        draft.set_sharer(sharer)?;
        draft.set_reserver(reserver)?;
        draft.set_listing(listing)?;
        draft.finalize()
    }

    #[must_use]
    pub const fn id(&self) -> &ConversationId {
        &self.root.props().id
    }

    #[must_use]
    pub fn sharer(&self) -> UserView {
        resolve_user_view(&self.root.props().sharer, self.root.passport())
    }

    #[must_use]
    pub fn reserver(&self) -> UserView {
        resolve_user_view(&self.root.props().reserver, self.root.passport())
    }

    /// Listing snapshot held by the conversation; may be stale.
    #[must_use]
    pub fn listing(&self) -> ItemListing {
        ItemListing::new(
            self.root.props().listing.clone(),
            Arc::clone(self.root.passport()),
        )
    }

    #[must_use]
    pub const fn messaging_conversation_id(&self) -> &MessagingConversationId {
        &self.root.props().messaging_conversation_id
    }

    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.root.props().expires_at
    }

    #[must_use]
    pub const fn props(&self) -> &ConversationProps {
        self.root.props()
    }

    pub fn set_sharer(&mut self, sharer: Option<UserRecord>) -> DomainResult<()> {
        self.root
            .guard("sharer", CONVERSATION, |p| p.can_manage_conversation)?;
        self.root.props_mut().sharer = require("sharer", sharer)?;
        Ok(())
    }

    pub fn set_reserver(&mut self, reserver: Option<UserRecord>) -> DomainResult<()> {
        self.root
            .guard("reserver", CONVERSATION, |p| p.can_manage_conversation)?;
        self.root.props_mut().reserver = require("reserver", reserver)?;
        Ok(())
    }

    pub fn set_listing(&mut self, listing: Option<ItemListingProps>) -> DomainResult<()> {
        self.root
            .guard("listing", CONVERSATION, |p| p.can_manage_conversation)?;
        self.root.props_mut().listing = require("listing", listing)?;
        Ok(())
    }

    pub fn set_messaging_conversation_id(
        &mut self,
        messaging_conversation_id: MessagingConversationId,
    ) -> DomainResult<()> {
        self.root.guard("messaging conversation id", CONVERSATION, |p| {
            p.can_manage_conversation
        })?;
        self.root.props_mut().messaging_conversation_id = messaging_conversation_id;
        Ok(())
    }

    /// Set `expires_at` to six months after `archival_date`.
    pub fn schedule_for_deletion(&mut self, archival_date: DateTime<Utc>) -> DomainResult<()> {
        self.schedule_for_deletion_with(
            archival_date,
            Duration::milliseconds(DEFAULT_RETENTION_MILLIS),
        )
    }

    /// Set `expires_at` to `retention` after `archival_date`.
    pub fn schedule_for_deletion_with(
        &mut self,
        archival_date: DateTime<Utc>,
        retention: Duration,
    ) -> DomainResult<()> {
        self.root
            .guard("expiration date", CONVERSATION, |p| p.can_manage_conversation)?;
        let expires_at = archival_date + retention;
        self.root.props_mut().expires_at = Some(expires_at);
        tracing::debug!(
            conversation_id = %self.id(),
            expires_at = %expires_at,
            "conversation scheduled for deletion"
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Loaders
    // ------------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_sharer(&self, users: &dyn UserRepository) -> DomainResult<UserView> {
        let record = users.get_by_id(self.root.props().sharer.id()).await?;
        Ok(resolve_user_view(&record, self.root.passport()))
    }

    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_reserver(&self, users: &dyn UserRepository) -> DomainResult<UserView> {
        let record = users.get_by_id(self.root.props().reserver.id()).await?;
        Ok(resolve_user_view(&record, self.root.passport()))
    }

    /// Load sharer and reserver concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first repository error.
    pub async fn load_participants(
        &self,
        users: &dyn UserRepository,
    ) -> DomainResult<(UserView, UserView)> {
        futures::try_join!(self.load_sharer(users), self.load_reserver(users))
    }

    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_listing(
        &self,
        listings: &dyn ItemListingRepository,
    ) -> DomainResult<ItemListing> {
        let props = listings.get_by_id(&self.root.props().listing.id).await?;
        Ok(ItemListing::new(props, Arc::clone(self.root.passport())))
    }

    /// # Errors
    ///
    /// Propagates the messaging service error untouched.
    pub async fn load_messages(&self, messages: &dyn MessageRepository) -> DomainResult<Vec<Message>> {
        Ok(messages
            .get_messages(&self.root.props().messaging_conversation_id)
            .await?)
    }
}

impl Aggregate for Conversation {
    fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        self.root.take_integration_events()
    }
}

/// Creation phase of a [`Conversation`].
#[derive(Debug)]
pub struct ConversationDraft {
    passport: Arc<dyn Passport>,
    id: ConversationId,
    sharer: Option<UserRecord>,
    reserver: Option<UserRecord>,
    listing: Option<ItemListingProps>,
    messaging_conversation_id: MessagingConversationId,
}

impl ConversationDraft {
    #[must_use]
    pub fn new(
        passport: Arc<dyn Passport>,
        id: ConversationId,
        messaging_conversation_id: MessagingConversationId,
    ) -> Self {
        Self {
            passport,
            id,
            sharer: None,
            reserver: None,
            listing: None,
            messaging_conversation_id,
        }
    }

    pub fn set_sharer(&mut self, sharer: Option<UserRecord>) -> DomainResult<()> {
        self.sharer = Some(require("sharer", sharer)?);
        Ok(())
    }

    pub fn set_reserver(&mut self, reserver: Option<UserRecord>) -> DomainResult<()> {
        self.reserver = Some(require("reserver", reserver)?);
        Ok(())
    }

    pub fn set_listing(&mut self, listing: Option<ItemListingProps>) -> DomainResult<()> {
        self.listing = Some(require("listing", listing)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails with the "cannot be null" error for a relation never set.
    pub fn finalize(self) -> DomainResult<Conversation> {
        let now = Utc::now();
        let props = ConversationProps {
            id: self.id,
            sharer: require("sharer", self.sharer)?,
            reserver: require("reserver", self.reserver)?,
            listing: require("listing", self.listing)?,
            messaging_conversation_id: self.messaging_conversation_id,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        Ok(Conversation::new(props, self.passport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::test_support::{conversation_props, member_passport, member_props};
    use crate::error::DomainError;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_participant_schedules_deletion_six_months_out() -> TestResult {
        let props = conversation_props("conv-1", "alice", "bob")?;
        let bob = member_props("bob")?;
        let mut conversation = Conversation::new(props, member_passport(&bob));
        let archived = Utc::now();

        conversation.schedule_for_deletion(archived)?;

        assert_eq!(
            conversation.expires_at(),
            Some(archived + Duration::milliseconds(15_552_000_000))
        );
        Ok(())
    }

    #[test]
    fn test_outsider_cannot_reassign_sharer() -> TestResult {
        let props = conversation_props("conv-1", "alice", "bob")?;
        let carol = member_props("carol")?;
        let mut conversation = Conversation::new(props, member_passport(&carol));

        let err = conversation
            .set_sharer(Some(UserRecord::from(carol.clone())))
            .err();

        assert_eq!(err, Some(DomainError::permission_denied("sharer", "conversation")));
        assert_eq!(conversation.sharer().id().as_str(), "alice");
        Ok(())
    }

    #[test]
    fn test_participant_cannot_clear_required_relation() -> TestResult {
        let props = conversation_props("conv-1", "alice", "bob")?;
        let alice = member_props("alice")?;
        let mut conversation = Conversation::new(props, member_passport(&alice));

        assert_eq!(
            conversation.set_reserver(None),
            Err(DomainError::required("reserver"))
        );
        Ok(())
    }

    #[test]
    fn test_draft_requires_every_relation() -> TestResult {
        let props = conversation_props("conv-1", "alice", "bob")?;
        let carol = member_props("carol")?;

        let err = Conversation::new_instance(
            member_passport(&carol),
            props.id.clone(),
            Some(props.sharer.clone()),
            Some(props.reserver.clone()),
            None,
            props.messaging_conversation_id.clone(),
        )
        .err();

        assert_eq!(err, Some(DomainError::required("listing")));
        Ok(())
    }

    #[test]
    fn test_getters_return_equal_fresh_views() -> TestResult {
        let props = conversation_props("conv-1", "alice", "bob")?;
        let alice = member_props("alice")?;
        let conversation = Conversation::new(props, member_passport(&alice));

        assert_eq!(conversation.sharer(), conversation.sharer());
        assert_eq!(conversation.listing(), conversation.listing());
        Ok(())
    }
}
