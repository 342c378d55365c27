//! Permission structs, one per bounded context, and the role permission
//! tables they are derived from.
//!
//! Context permission structs are never stored. A passport computes one
//! fresh each time it issues a Visa, from the actor's role table and the
//! actor's relationship to the target. Role tables are stored on roles and
//! travel with the role snapshot on each user record.

use serde::{Deserialize, Serialize};

/// Permission struct carried by a Visa.
pub trait DomainPermissions: Clone + std::fmt::Debug + PartialEq + Eq + Send + Sync + 'static {
    /// Bounded context the struct belongs to
    const CONTEXT: &'static str;

    /// Every flag granted.
    fn all_granted() -> Self;
}

// ============================================================================
// CONTEXT PERMISSIONS
// ============================================================================

/// What an actor may do to one user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDomainPermissions {
    pub is_editing_own_account: bool,
    pub is_system_account: bool,
    pub can_block_users: bool,
    pub can_manage_user_roles: bool,
    pub can_view_all_users: bool,
}

impl DomainPermissions for UserDomainPermissions {
    const CONTEXT: &'static str = "user";

    fn all_granted() -> Self {
        Self {
            is_editing_own_account: true,
            is_system_account: true,
            can_block_users: true,
            can_manage_user_roles: true,
            can_view_all_users: true,
        }
    }
}

/// What an actor may do to one item listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListingDomainPermissions {
    pub can_create_item_listing: bool,
    pub can_update_item_listing: bool,
    pub can_publish_item_listing: bool,
    pub can_unpublish_item_listing: bool,
    pub can_delete_item_listing: bool,
    pub can_moderate_item_listing: bool,
    pub can_view_item_listing: bool,
}

impl DomainPermissions for ItemListingDomainPermissions {
    const CONTEXT: &'static str = "item listing";

    fn all_granted() -> Self {
        Self {
            can_create_item_listing: true,
            can_update_item_listing: true,
            can_publish_item_listing: true,
            can_unpublish_item_listing: true,
            can_delete_item_listing: true,
            can_moderate_item_listing: true,
            can_view_item_listing: true,
        }
    }
}

/// What an actor may do to one conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDomainPermissions {
    pub can_create_conversation: bool,
    pub can_manage_conversation: bool,
    pub can_view_conversation: bool,
}

impl DomainPermissions for ConversationDomainPermissions {
    const CONTEXT: &'static str = "conversation";

    fn all_granted() -> Self {
        Self {
            can_create_conversation: true,
            can_manage_conversation: true,
            can_view_conversation: true,
        }
    }
}

/// What an actor may do to one reservation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequestDomainPermissions {
    pub can_create_request: bool,
    pub can_accept_request: bool,
    pub can_reject_request: bool,
    pub can_cancel_request: bool,
    pub can_close_request: bool,
    pub can_view_request: bool,
}

impl DomainPermissions for ReservationRequestDomainPermissions {
    const CONTEXT: &'static str = "reservation request";

    fn all_granted() -> Self {
        Self {
            can_create_request: true,
            can_accept_request: true,
            can_reject_request: true,
            can_cancel_request: true,
            can_close_request: true,
            can_view_request: true,
        }
    }
}

/// Permission set for a trusted system context, one struct per context.
///
/// `Default` grants everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPermissions {
    pub user: UserDomainPermissions,
    pub item_listing: ItemListingDomainPermissions,
    pub conversation: ConversationDomainPermissions,
    pub reservation_request: ReservationRequestDomainPermissions,
}

impl Default for SystemPermissions {
    fn default() -> Self {
        Self {
            user: UserDomainPermissions::all_granted(),
            item_listing: ItemListingDomainPermissions::all_granted(),
            conversation: ConversationDomainPermissions::all_granted(),
            reservation_request: ReservationRequestDomainPermissions::all_granted(),
        }
    }
}

// ============================================================================
// ROLE PERMISSION TABLES
// ============================================================================

/// Capabilities granted to a personal user by their role.
///
/// Listing, conversation and reservation capabilities are combined with
/// ownership or participation when a Visa is issued; they never grant
/// access to someone else's aggregate on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalUserRolePermissions {
    pub can_create_item_listing: bool,
    pub can_update_item_listing: bool,
    pub can_delete_item_listing: bool,
    pub can_create_conversation: bool,
    pub can_manage_conversation: bool,
    pub can_create_reservation_request: bool,
    pub can_manage_reservation_request: bool,
    pub can_block_users: bool,
    pub can_manage_user_roles: bool,
    pub can_view_all_users: bool,
}

impl PersonalUserRolePermissions {
    /// Default table for an ordinary marketplace member.
    #[must_use]
    pub const fn member() -> Self {
        Self {
            can_create_item_listing: true,
            can_update_item_listing: true,
            can_delete_item_listing: true,
            can_create_conversation: true,
            can_manage_conversation: true,
            can_create_reservation_request: true,
            can_manage_reservation_request: true,
            can_block_users: false,
            can_manage_user_roles: false,
            can_view_all_users: false,
        }
    }
}

/// Capabilities granted to an administrator by their role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminRolePermissions {
    pub can_moderate_listings: bool,
    pub can_delete_content: bool,
    pub can_manage_user_roles: bool,
    pub can_block_users: bool,
    pub can_view_all_users: bool,
    pub can_moderate_conversations: bool,
    pub can_moderate_reservation_requests: bool,
}

impl AdminRolePermissions {
    /// Table with every administrative capability.
    #[must_use]
    pub const fn super_admin() -> Self {
        Self {
            can_moderate_listings: true,
            can_delete_content: true,
            can_manage_user_roles: true,
            can_block_users: true,
            can_view_all_users: true,
            can_moderate_conversations: true,
            can_moderate_reservation_requests: true,
        }
    }
}
