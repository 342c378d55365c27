#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Aggregate loaders against in-memory repositories.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    admin, conversation, fixed_time, listing, member, member_passport, new_request, view_as,
};
use sharing_core::domain::aggregates::{
    AdminRoleProps, Conversation, ItemListing, ItemListingProps, PersonalUser,
    PersonalUserRoleProps, UserRecord,
};
use sharing_core::domain::identifiers::{ItemListingId, MessageId, RoleId, UserId};
use sharing_core::domain::permissions::{AdminRolePermissions, PersonalUserRolePermissions};
use sharing_core::domain::repository::{
    ItemListingRepository, Message, MessageRepository, RepositoryError, RepositoryResult,
    RoleRepository, UserRepository,
};
use sharing_core::domain::values::{ListingStateValue, MessagingConversationId, RoleName};
use sharing_core::DomainError;

type TestResult = Result<(), Box<dyn std::error::Error>>;

// ============================================================================
// IN-MEMORY REPOSITORIES
// ============================================================================

#[derive(Default)]
struct InMemoryUsers {
    users: HashMap<UserId, UserRecord>,
    reads: AtomicUsize,
}

impl InMemoryUsers {
    fn with(records: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: records
                .into_iter()
                .map(|record| (record.id().clone(), record))
                .collect(),
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get_by_id(&self, id: &UserId) -> RepositoryResult<UserRecord> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn save(&self, _record: &UserRecord) -> RepositoryResult<()> {
        Ok(())
    }
}

struct InMemoryListings {
    listings: HashMap<ItemListingId, ItemListingProps>,
}

#[async_trait]
impl ItemListingRepository for InMemoryListings {
    async fn get_by_id(&self, id: &ItemListingId) -> RepositoryResult<ItemListingProps> {
        self.listings
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("listing", id))
    }

    async fn get_by_sharer_id(
        &self,
        sharer_id: &UserId,
    ) -> RepositoryResult<Vec<ItemListingProps>> {
        Ok(self
            .listings
            .values()
            .filter(|listing| listing.sharer.id() == sharer_id)
            .cloned()
            .collect())
    }

    async fn save(&self, _props: &ItemListingProps) -> RepositoryResult<()> {
        Ok(())
    }
}

struct FailingMessages;

#[async_trait]
impl MessageRepository for FailingMessages {
    async fn get_messages(
        &self,
        _messaging_conversation_id: &MessagingConversationId,
    ) -> RepositoryResult<Vec<Message>> {
        Err(RepositoryError::storage_error("messaging service unavailable"))
    }
}

struct FixedMessages(Vec<Message>);

#[async_trait]
impl MessageRepository for FixedMessages {
    async fn get_messages(
        &self,
        _messaging_conversation_id: &MessagingConversationId,
    ) -> RepositoryResult<Vec<Message>> {
        Ok(self.0.clone())
    }
}

struct Roles;

#[async_trait]
impl RoleRepository for Roles {
    async fn get_personal_user_role_by_id(
        &self,
        id: &RoleId,
    ) -> RepositoryResult<PersonalUserRoleProps> {
        Ok(PersonalUserRoleProps {
            id: id.clone(),
            name: RoleName::new("Member (revised)")
                .map_err(|e| RepositoryError::storage_error(e.to_string()))?,
            is_default: true,
            permissions: PersonalUserRolePermissions::default(),
            created_at: fixed_time(),
            updated_at: Utc::now(),
        })
    }

    async fn get_admin_role_by_id(&self, id: &RoleId) -> RepositoryResult<AdminRoleProps> {
        Err(RepositoryError::not_found("admin role", id))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_conversation_loads_both_participants() -> TestResult {
    let mut fresh_bob = member("bob");
    fresh_bob.is_blocked = true;
    let users = InMemoryUsers::with([
        UserRecord::from(member("alice")),
        UserRecord::from(fresh_bob),
    ]);
    let conversation = Conversation::new(
        conversation("conv-1", "alice", "bob"),
        member_passport("alice"),
    );

    let (sharer, reserver) = conversation.load_participants(&users).await?;

    assert_eq!(sharer.id().as_str(), "alice");
    assert!(reserver.is_blocked());
    assert!(!conversation.reserver().is_blocked());
    assert_eq!(users.reads.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_loader_error_propagates_untouched() {
    let users = InMemoryUsers::with([UserRecord::from(member("alice"))]);
    let conversation = Conversation::new(
        conversation("conv-1", "alice", "bob"),
        member_passport("alice"),
    );

    let err = conversation.load_reserver(&users).await.err();

    assert!(matches!(
        err,
        Some(DomainError::Repository(RepositoryError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_load_listing_returns_fresh_copy() -> TestResult {
    let stored = listing("listing-1", "alice", ListingStateValue::PAUSED);
    let listings = InMemoryListings {
        listings: HashMap::from([(stored.id.clone(), stored)]),
    };
    let conversation = Conversation::new(
        conversation("conv-1", "alice", "bob"),
        member_passport("bob"),
    );

    let fresh: ItemListing = conversation.load_listing(&listings).await?;

    assert!(conversation.listing().is_active());
    assert!(fresh.state().is(ListingStateValue::PAUSED));
    Ok(())
}

#[tokio::test]
async fn test_load_messages() -> TestResult {
    let conversation = Conversation::new(
        conversation("conv-1", "alice", "bob"),
        member_passport("bob"),
    );
    let message = Message {
        id: MessageId::parse("msg-1")?,
        author_id: UserId::parse("bob")?,
        content: "Is the tent still available?".to_string(),
        created_at: fixed_time(),
    };

    let messages = conversation
        .load_messages(&FixedMessages(vec![message.clone()]))
        .await?;
    assert_eq!(messages, vec![message]);

    let err = conversation.load_messages(&FailingMessages).await.err();
    assert_eq!(
        err,
        Some(DomainError::Repository(RepositoryError::storage_error(
            "messaging service unavailable"
        )))
    );
    Ok(())
}

#[tokio::test]
async fn test_reservation_loads_sharer_through_listing() -> TestResult {
    let users = InMemoryUsers::with([
        UserRecord::from(member("alice")),
        UserRecord::from(member("bob")),
    ]);
    let stored = listing("listing-1", "alice", ListingStateValue::ACTIVE);
    let listings = InMemoryListings {
        listings: HashMap::from([(stored.id.clone(), stored)]),
    };
    let request = view_as(&new_request(member_passport("bob")), member_passport("alice"));

    let sharer = request.load_sharer(&users).await?;
    let reserver = request.load_reserver(&users).await?;
    let listing = request.load_listing(&listings).await?;

    assert_eq!(sharer.id().as_str(), "alice");
    assert_eq!(reserver.id().as_str(), "bob");
    assert_eq!(listing.id().as_str(), "listing-1");
    assert_eq!(listings.get_by_sharer_id(sharer.id()).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_reservation_without_listing_cannot_load_sharer() {
    let users = InMemoryUsers::default();
    let mut props = new_request(member_passport("bob")).props().clone();
    props.listing = None;
    let request = sharing_core::ReservationRequest::new(props, member_passport("bob"));

    assert_eq!(
        request.load_sharer(&users).await.err(),
        Some(DomainError::required("listing"))
    );
}

#[tokio::test]
async fn test_load_role() -> TestResult {
    let alice = PersonalUser::new(member("alice"), member_passport("alice"));

    let role = alice.load_role(&Roles).await?;
    assert_eq!(
        role.map(|r| r.name.to_string()),
        Some("Member (revised)".to_string())
    );

    let root = sharing_core::AdminUser::new(
        admin("root", AdminRolePermissions::super_admin()),
        member_passport("alice"),
    );
    assert!(matches!(
        root.load_role(&Roles).await,
        Err(DomainError::Repository(RepositoryError::NotFound(_)))
    ));
    Ok(())
}
