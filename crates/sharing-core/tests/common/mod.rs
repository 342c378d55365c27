//! Shared fixtures for sharing-core integration tests.

#![allow(dead_code, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sharing_core::domain::aggregates::{
    AdminRoleProps, AdminUserProps, ConversationProps, ItemListingProps, PersonalUserProps,
    PersonalUserRoleProps, ReservationRequest, UserAccount, UserRecord,
};
use sharing_core::domain::identifiers::{
    ConversationId, ItemListingId, ReservationRequestId, RoleId, UserId,
};
use sharing_core::domain::passport::{
    AdminUserPassport, Passport, PersonalUserPassport, SystemPassport, TrustedContext,
};
use sharing_core::domain::permissions::{
    AdminRolePermissions, PersonalUserRolePermissions, SystemPermissions,
};
use sharing_core::domain::values::{
    Category, Description, Email, ListingStateValue, Location, MessagingConversationId,
    PersonName, RoleName, Title, Username,
};

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn account(id: &str) -> UserAccount {
    UserAccount {
        email: Email::new(format!("{id}@example.com")).expect("valid email"),
        username: Username::new(id).expect("valid username"),
        first_name: PersonName::new(id).expect("valid name"),
        last_name: PersonName::new("Tester").expect("valid name"),
    }
}

pub fn member_with_role(id: &str, permissions: PersonalUserRolePermissions) -> PersonalUserProps {
    PersonalUserProps {
        id: UserId::parse(id).expect("valid id"),
        is_blocked: false,
        has_completed_onboarding: true,
        account: account(id),
        role: Some(PersonalUserRoleProps {
            id: RoleId::parse("role-member").expect("valid id"),
            name: RoleName::new("Member").expect("valid role name"),
            is_default: true,
            permissions,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        }),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn member(id: &str) -> PersonalUserProps {
    member_with_role(id, PersonalUserRolePermissions::member())
}

pub fn admin(id: &str, permissions: AdminRolePermissions) -> AdminUserProps {
    AdminUserProps {
        id: UserId::parse(id).expect("valid id"),
        is_blocked: false,
        account: account(id),
        role: Some(AdminRoleProps {
            id: RoleId::parse("role-admin").expect("valid id"),
            name: RoleName::new("Administrator").expect("valid role name"),
            is_default: false,
            permissions,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        }),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn member_passport(id: &str) -> Arc<dyn Passport> {
    Arc::new(PersonalUserPassport::new(&member(id)))
}

pub fn admin_passport(id: &str, permissions: AdminRolePermissions) -> Arc<dyn Passport> {
    Arc::new(AdminUserPassport::new(&admin(id, permissions)))
}

pub fn system_passport(permissions: SystemPermissions) -> Arc<dyn Passport> {
    Arc::new(SystemPassport::new(
        TrustedContext::elevate("integration-test"),
        permissions,
    ))
}

pub fn listing(id: &str, sharer: &str, state: &str) -> ItemListingProps {
    let now = Utc::now();
    ItemListingProps {
        id: ItemListingId::parse(id).expect("valid id"),
        sharer: UserRecord::from(member(sharer)),
        title: Title::new("Camping tent").expect("valid title"),
        description: Description::new("Four person tent, used twice").expect("valid description"),
        category: Category::new("Outdoors").expect("valid category"),
        location: Location::new("Portland, OR").expect("valid location"),
        sharing_period_start: now,
        sharing_period_end: now + Duration::days(120),
        state: ListingStateValue::new(state).expect("valid state"),
        images: vec!["tent.jpg".to_string()],
        is_deleted: false,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn conversation(id: &str, sharer: &str, reserver: &str) -> ConversationProps {
    ConversationProps {
        id: ConversationId::parse(id).expect("valid id"),
        sharer: UserRecord::from(member(sharer)),
        reserver: UserRecord::from(member(reserver)),
        listing: listing("listing-1", sharer, ListingStateValue::ACTIVE),
        messaging_conversation_id: MessagingConversationId::new("CH-0001").expect("valid id"),
        expires_at: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Bob's request for Alice's active tent, tomorrow to +30 days.
pub fn new_request(passport: Arc<dyn Passport>) -> ReservationRequest {
    let now = Utc::now();
    ReservationRequest::new_instance(
        passport,
        ReservationRequestId::parse("rr-1").expect("valid id"),
        Some(now + Duration::days(1)),
        Some(now + Duration::days(30)),
        Some(listing("listing-1", "alice", ListingStateValue::ACTIVE)),
        Some(UserRecord::from(member("bob"))),
    )
    .expect("request is created")
}

/// The same stored request viewed through another passport.
pub fn view_as(request: &ReservationRequest, passport: Arc<dyn Passport>) -> ReservationRequest {
    ReservationRequest::new(request.props().clone(), passport)
}
