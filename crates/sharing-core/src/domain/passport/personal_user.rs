//! Passport for a marketplace member.
//!
//! The user context compares identities and reads the member's role table.
//! Listing, conversation and reservation contexts grant by relationship
//! (listing owner, conversation participant, sharer or reserver of a
//! request), gated by the matching role capability.

use crate::domain::aggregates::user::PersonalUserProps;
use crate::domain::identifiers::UserId;
use crate::domain::passport::{
    is_same_user, ConversationPassport, ConversationVisaTarget, ItemListingPassport,
    ItemListingVisaTarget, Passport, Principal, ReservationRequestPassport,
    ReservationRequestVisaTarget, UserPassport, UserVisaTarget, Visa,
};
use crate::domain::permissions::{
    ConversationDomainPermissions, ItemListingDomainPermissions, PersonalUserRolePermissions,
    ReservationRequestDomainPermissions, UserDomainPermissions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalUserPassport {
    actor_id: UserId,
    role: PersonalUserRolePermissions,
}

impl PersonalUserPassport {
    /// Capture the acting member. A member without a role gets an all-false
    /// role table.
    #[must_use]
    pub fn new(actor: &PersonalUserProps) -> Self {
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

impl UserPassport for PersonalUserPassport {
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

impl ItemListingPassport for PersonalUserPassport {
    fn for_item_listing(
        &self,
        target: &ItemListingVisaTarget<'_>,
    ) -> Visa<ItemListingDomainPermissions> {
        let is_owner = is_same_user(&self.actor_id, target.sharer_id);
        let can_update = is_owner && self.role.can_update_item_listing;

        Visa::issue(
            self.principal(),
            target.listing_id.as_str(),
            ItemListingDomainPermissions {
                can_create_item_listing: self.role.can_create_item_listing,
                can_update_item_listing: can_update,
                can_publish_item_listing: can_update,
                can_unpublish_item_listing: can_update,
                can_delete_item_listing: is_owner && self.role.can_delete_item_listing,
                can_moderate_item_listing: false,
                can_view_item_listing: true,
            },
        )
    }
}

impl ConversationPassport for PersonalUserPassport {
    fn for_conversation(
        &self,
        target: &ConversationVisaTarget<'_>,
    ) -> Visa<ConversationDomainPermissions> {
        let is_participant = is_same_user(&self.actor_id, target.sharer_id)
            || is_same_user(&self.actor_id, target.reserver_id);

        Visa::issue(
            self.principal(),
            target.conversation_id.as_str(),
            ConversationDomainPermissions {
                can_create_conversation: self.role.can_create_conversation,
                can_manage_conversation: is_participant && self.role.can_manage_conversation,
                can_view_conversation: is_participant,
            },
        )
    }
}

impl ReservationRequestPassport for PersonalUserPassport {
    fn for_reservation_request(
        &self,
        target: &ReservationRequestVisaTarget<'_>,
    ) -> Visa<ReservationRequestDomainPermissions> {
        let is_sharer = is_same_user(&self.actor_id, target.sharer_id);
        let is_reserver = is_same_user(&self.actor_id, target.reserver_id);
        let can_manage = self.role.can_manage_reservation_request;

        Visa::issue(
            self.principal(),
            target.reservation_request_id.as_str(),
            ReservationRequestDomainPermissions {
                can_create_request: self.role.can_create_reservation_request,
                can_accept_request: is_sharer && can_manage,
                can_reject_request: is_sharer && can_manage,
                can_cancel_request: is_reserver && can_manage,
                can_close_request: (is_sharer || is_reserver) && can_manage,
                can_view_request: is_sharer || is_reserver,
            },
        )
    }
}

impl Passport for PersonalUserPassport {
    fn principal(&self) -> Principal {
        Principal::PersonalUser(self.actor_id.clone())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::test_support::{member_props, member_props_without_role};
    use crate::domain::identifiers::{ConversationId, ItemListingId, ReservationRequestId};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_editing_own_account_is_identity_comparison() -> TestResult {
        let passport = PersonalUserPassport::new(&member_props("alice")?);
        let alice = UserId::parse("alice")?;
        let bob = UserId::parse("bob")?;

        let own = passport.for_user(&UserVisaTarget { user_id: &alice });
        let other = passport.for_user(&UserVisaTarget { user_id: &bob });

        assert!(own.evaluate(|p| p.is_editing_own_account));
        assert!(!other.evaluate(|p| p.is_editing_own_account));
        assert!(!other.evaluate(|p| p.can_block_users));
        Ok(())
    }

    #[test]
    fn test_listing_owner_gets_update_rights() -> TestResult {
        let passport = PersonalUserPassport::new(&member_props("alice")?);
        let listing = ItemListingId::parse("listing-1")?;
        let alice = UserId::parse("alice")?;
        let bob = UserId::parse("bob")?;

        let owned = passport.for_item_listing(&ItemListingVisaTarget {
            listing_id: &listing,
            sharer_id: Some(&alice),
        });
        let foreign = passport.for_item_listing(&ItemListingVisaTarget {
            listing_id: &listing,
            sharer_id: Some(&bob),
        });

        assert!(owned.evaluate(|p| p.can_update_item_listing && p.can_delete_item_listing));
        assert!(!foreign.evaluate(|p| p.can_update_item_listing));
        assert!(foreign.evaluate(|p| p.can_view_item_listing));
        assert!(!owned.evaluate(|p| p.can_moderate_item_listing));
        Ok(())
    }

    #[test]
    fn test_conversation_participants_manage() -> TestResult {
        let passport = PersonalUserPassport::new(&member_props("bob")?);
        let conversation = ConversationId::parse("conv-1")?;
        let alice = UserId::parse("alice")?;
        let bob = UserId::parse("bob")?;
        let carol = UserId::parse("carol")?;

        let participant = passport.for_conversation(&ConversationVisaTarget {
            conversation_id: &conversation,
            sharer_id: Some(&alice),
            reserver_id: Some(&bob),
        });
        let outsider = passport.for_conversation(&ConversationVisaTarget {
            conversation_id: &conversation,
            sharer_id: Some(&alice),
            reserver_id: Some(&carol),
        });

        assert!(participant.evaluate(|p| p.can_manage_conversation));
        assert!(!outsider.evaluate(|p| p.can_manage_conversation || p.can_view_conversation));
        Ok(())
    }

    #[test]
    fn test_reservation_grants_split_by_relationship() -> TestResult {
        let request = ReservationRequestId::parse("rr-1")?;
        let alice = UserId::parse("alice")?;
        let bob = UserId::parse("bob")?;
        let target = ReservationRequestVisaTarget {
            reservation_request_id: &request,
            reserver_id: Some(&bob),
            sharer_id: Some(&alice),
        };

        let as_sharer = PersonalUserPassport::new(&member_props("alice")?)
            .for_reservation_request(&target);
        let as_reserver =
            PersonalUserPassport::new(&member_props("bob")?).for_reservation_request(&target);

        assert!(as_sharer.evaluate(|p| p.can_accept_request && p.can_reject_request));
        assert!(!as_sharer.evaluate(|p| p.can_cancel_request));
        assert!(as_reserver.evaluate(|p| p.can_cancel_request && p.can_close_request));
        assert!(!as_reserver.evaluate(|p| p.can_accept_request));
        Ok(())
    }

    #[test]
    fn test_member_without_role_gets_nothing_but_identity() -> TestResult {
        let passport = PersonalUserPassport::new(&member_props_without_role("alice")?);
        let alice = UserId::parse("alice")?;
        let listing = ItemListingId::parse("listing-1")?;

        let own = passport.for_user(&UserVisaTarget { user_id: &alice });
        let listing_visa = passport.for_item_listing(&ItemListingVisaTarget {
            listing_id: &listing,
            sharer_id: Some(&alice),
        });

        assert!(own.evaluate(|p| p.is_editing_own_account));
        assert!(!listing_visa.evaluate(|p| p.can_update_item_listing));
        Ok(())
    }
}
