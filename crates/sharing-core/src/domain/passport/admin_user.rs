//! Passport for an administrator.
//!
//! Every context reads the admin role table. Identity is compared only for
//! `is_editing_own_account`, which also applies when the target is another
//! administrator: the role-derived flags stay the same, the self/other bit
//! does not.

use crate::domain::aggregates::user::AdminUserProps;
use crate::domain::identifiers::UserId;
use crate::domain::passport::{
    ConversationPassport, ConversationVisaTarget, ItemListingPassport, ItemListingVisaTarget,
    Passport, Principal, ReservationRequestPassport, ReservationRequestVisaTarget, UserPassport,
    UserVisaTarget, Visa,
};
use crate::domain::permissions::{
    AdminRolePermissions, ConversationDomainPermissions, ItemListingDomainPermissions,
    ReservationRequestDomainPermissions, UserDomainPermissions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUserPassport {
    actor_id: UserId,
    role: AdminRolePermissions,
}

impl AdminUserPassport {
    #[must_use]
    pub fn new(actor: &AdminUserProps) -> Self {
        Self {
            actor_id: actor.id.clone(),
            role: actor
                .role
                .as_ref()
                .map(|role| role.permissions)
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub const fn actor_id(&self) -> &UserId {
        &self.actor_id
    }
}

impl UserPassport for AdminUserPassport {
    fn for_user(&self, target: &UserVisaTarget<'_>) -> Visa<UserDomainPermissions> {
        Visa::issue(
            self.principal(),
            target.user_id.as_str(),
            UserDomainPermissions {
                is_editing_own_account: target.user_id == &self.actor_id,
                is_system_account: false,
                can_block_users: self.role.can_block_users,
                can_manage_user_roles: self.role.can_manage_user_roles,
                can_view_all_users: self.role.can_view_all_users,
            },
        )
    }
}

impl ItemListingPassport for AdminUserPassport {
    fn for_item_listing(
        &self,
        target: &ItemListingVisaTarget<'_>,
    ) -> Visa<ItemListingDomainPermissions> {
        Visa::issue(
            self.principal(),
            target.listing_id.as_str(),
            ItemListingDomainPermissions {
                can_create_item_listing: false,
                can_update_item_listing: false,
                can_publish_item_listing: self.role.can_moderate_listings,
                can_unpublish_item_listing: self.role.can_moderate_listings,
                can_delete_item_listing: self.role.can_delete_content,
                can_moderate_item_listing: self.role.can_moderate_listings,
                can_view_item_listing: true,
            },
        )
    }
}

impl ConversationPassport for AdminUserPassport {
    fn for_conversation(
        &self,
        target: &ConversationVisaTarget<'_>,
    ) -> Visa<ConversationDomainPermissions> {
        Visa::issue(
            self.principal(),
            target.conversation_id.as_str(),
            ConversationDomainPermissions {
                can_create_conversation: false,
                can_manage_conversation: self.role.can_moderate_conversations,
                can_view_conversation: self.role.can_moderate_conversations,
            },
        )
    }
}

impl ReservationRequestPassport for AdminUserPassport {
    fn for_reservation_request(
        &self,
        target: &ReservationRequestVisaTarget<'_>,
    ) -> Visa<ReservationRequestDomainPermissions> {
        let can_moderate = self.role.can_moderate_reservation_requests;

        Visa::issue(
            self.principal(),
            target.reservation_request_id.as_str(),
            ReservationRequestDomainPermissions {
                can_create_request: false,
                can_accept_request: false,
                can_reject_request: false,
                can_cancel_request: can_moderate,
                can_close_request: can_moderate,
                can_view_request: can_moderate,
            },
        )
    }
}

impl Passport for AdminUserPassport {
    fn principal(&self) -> Principal {
        Principal::AdminUser(self.actor_id.clone())
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
