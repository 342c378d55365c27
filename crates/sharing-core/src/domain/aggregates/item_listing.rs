//! Item listing aggregate.
//!
//! A listing is something a sharer offers for a period. Descriptive fields
//! are guarded by `can_update_item_listing`; state only moves through the
//! transition methods, each gated by its own flag.
//!
//! # State transitions
//!
//! | Method | From | Permission |
//! |---|---|---|
//! | `publish` | Drafted, Paused, Appeal Requested | `can_publish_item_listing` |
//! | `reinstate` | Cancelled, Expired | `can_publish_item_listing` |
//! | `pause` | Active | `can_unpublish_item_listing` |
//! | `cancel` | anything but Cancelled | `can_unpublish_item_listing` |
//! | `set_blocked(true)` | any | `can_moderate_item_listing` |
//! | `set_blocked(false)` | Blocked, moves to Paused | `can_moderate_item_listing` |
//! | `request_delete` | any | `can_delete_item_listing` |
//!
//! A blocked listing refuses every transition except unblocking.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{require, Aggregate, AggregateRoot};
use crate::domain::events::IntegrationEvent;
use crate::domain::identifiers::ItemListingId;
use crate::domain::passport::{ItemListingVisaTarget, Passport};
use crate::domain::permissions::ItemListingDomainPermissions;
use crate::domain::repository::UserRepository;
use crate::domain::values::{Category, Description, ListingStateValue, Location, Title};
use crate::error::{DomainError, DomainResult};

use super::user::{resolve_user_view, UserRecord, UserView};

const ITEM_LISTING: &str = "item listing";

pub const BLOCKED_LISTING_VIOLATION: &str = "Cannot change the state of a blocked listing";
pub const SHARING_PERIOD_VIOLATION: &str = "Sharing period start date must be before end date";

// ============================================================================
// PROPS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListingProps {
    pub id: ItemListingId,
    pub sharer: UserRecord,
    pub title: Title,
    pub description: Description,
    pub category: Category,
    pub location: Location,
    pub sharing_period_start: DateTime<Utc>,
    pub sharing_period_end: DateTime<Utc>,
    pub state: ListingStateValue,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemListingProps {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is(ListingStateValue::ACTIVE)
    }
}

/// Descriptive fields supplied when a listing is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemListing {
    pub title: Title,
    pub description: Description,
    pub category: Category,
    pub location: Location,
    pub sharing_period_start: DateTime<Utc>,
    pub sharing_period_end: DateTime<Utc>,
    pub images: Vec<String>,
}

fn check_sharing_period(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
    crate::invariant!(end > start, DomainError::business_rule(SHARING_PERIOD_VIOLATION));
    Ok(())
}

// ============================================================================
// AGGREGATE
// ============================================================================

#[derive(Debug, PartialEq)]
pub struct ItemListing {
    root: AggregateRoot<ItemListingProps, ItemListingDomainPermissions>,
}

impl ItemListing {
    #[must_use]
    pub fn new(props: ItemListingProps, passport: Arc<dyn Passport>) -> Self {
        let visa = passport.item_listing().for_item_listing(&ItemListingVisaTarget {
            listing_id: &props.id,
            sharer_id: Some(props.sharer.id()),
        });
        Self {
            root: AggregateRoot::new(props, passport, visa),
        }
    }

    /// Create a listing, published straight away unless `is_draft`.
    ///
    /// # Errors
    ///
    /// Fails when the sharer is missing or the sharing period is inverted.
    pub fn new_instance(
        passport: Arc<dyn Passport>,
        id: ItemListingId,
        sharer: Option<UserRecord>,
        fields: NewItemListing,
        is_draft: bool,
    ) -> DomainResult<Self> {
        let mut draft = ItemListingDraft::new(passport, id);
        draft.set_sharer(sharer)?;
        draft.set_title(fields.title);
        draft.set_description(fields.description);
        draft.set_category(fields.category);
        draft.set_location(fields.location);
        draft.set_sharing_period(fields.sharing_period_start, fields.sharing_period_end)?;
        draft.set_images(fields.images);
        draft.set_draft(is_draft);
        draft.finalize()
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn id(&self) -> &ItemListingId {
        &self.root.props().id
    }

    /// Fresh view of the sharer, resolved from the stored record.
    #[must_use]
    pub fn sharer(&self) -> UserView {
        resolve_user_view(&self.root.props().sharer, self.root.passport())
    }

    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.root.props().title
    }

    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.root.props().description
    }

    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.root.props().category
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.root.props().location
    }

    #[must_use]
    pub const fn sharing_period_start(&self) -> DateTime<Utc> {
        self.root.props().sharing_period_start
    }

    #[must_use]
    pub const fn sharing_period_end(&self) -> DateTime<Utc> {
        self.root.props().sharing_period_end
    }

    #[must_use]
    pub const fn state(&self) -> &ListingStateValue {
        &self.root.props().state
    }

    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.root.props().images
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.root.props().is_deleted
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.root.props().is_active()
    }

    #[must_use]
    pub const fn props(&self) -> &ItemListingProps {
        self.root.props()
    }

    // ------------------------------------------------------------------------
    // Guarded setters
    // ------------------------------------------------------------------------

    pub fn set_title(&mut self, title: Title) -> DomainResult<()> {
        self.root
            .guard("title", ITEM_LISTING, |p| p.can_update_item_listing)?;
        self.root.props_mut().title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: Description) -> DomainResult<()> {
        self.root
            .guard("description", ITEM_LISTING, |p| p.can_update_item_listing)?;
        self.root.props_mut().description = description;
        Ok(())
    }

    pub fn set_category(&mut self, category: Category) -> DomainResult<()> {
        self.root
            .guard("category", ITEM_LISTING, |p| p.can_update_item_listing)?;
        self.root.props_mut().category = category;
        Ok(())
    }

    pub fn set_location(&mut self, location: Location) -> DomainResult<()> {
        self.root
            .guard("location", ITEM_LISTING, |p| p.can_update_item_listing)?;
        self.root.props_mut().location = location;
        Ok(())
    }

    pub fn set_sharing_period(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.root
            .guard("sharing period", ITEM_LISTING, |p| p.can_update_item_listing)?;
        check_sharing_period(start, end)?;
        let props = self.root.props_mut();
        props.sharing_period_start = start;
        props.sharing_period_end = end;
        Ok(())
    }

    pub fn set_images(&mut self, images: Vec<String>) -> DomainResult<()> {
        self.root
            .guard("images", ITEM_LISTING, |p| p.can_update_item_listing)?;
        self.root.props_mut().images = images;
        Ok(())
    }

    /// State is only assignable while drafting; afterwards use a transition.
    ///
    /// # Errors
    ///
    /// Always fails with an authorization error.
    pub fn set_state(&mut self, _state: ListingStateValue) -> DomainResult<()> {
        Err(DomainError::permission_denied("state", ITEM_LISTING))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    pub fn publish(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", ITEM_LISTING, |p| p.can_publish_item_listing)?;
        self.ensure_not_blocked()?;
        self.ensure_state_in(
            &[
                ListingStateValue::DRAFTED,
                ListingStateValue::PAUSED,
                ListingStateValue::APPEAL_REQUESTED,
            ],
            "Can only publish drafted, paused or appealed listings",
        )?;
        self.move_to(ListingStateValue::ACTIVE);
        Ok(())
    }

    pub fn reinstate(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", ITEM_LISTING, |p| p.can_publish_item_listing)?;
        self.ensure_not_blocked()?;
        self.ensure_state_in(
            &[ListingStateValue::CANCELLED, ListingStateValue::EXPIRED],
            "Can only reinstate cancelled or expired listings",
        )?;
        self.move_to(ListingStateValue::ACTIVE);
        Ok(())
    }

    pub fn pause(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", ITEM_LISTING, |p| p.can_unpublish_item_listing)?;
        self.ensure_not_blocked()?;
        self.ensure_state_in(&[ListingStateValue::ACTIVE], "Can only pause active listings")?;
        self.move_to(ListingStateValue::PAUSED);
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.root
            .guard("state", ITEM_LISTING, |p| p.can_unpublish_item_listing)?;
        self.ensure_not_blocked()?;
        if self.state().is(ListingStateValue::CANCELLED) {
            return Err(DomainError::business_rule("Listing is already cancelled"));
        }
        self.move_to(ListingStateValue::CANCELLED);
        Ok(())
    }

    /// Block or unblock. Unblocking leaves the listing paused for the sharer
    /// to republish.
    pub fn set_blocked(&mut self, blocked: bool) -> DomainResult<()> {
        self.root
            .guard("state", ITEM_LISTING, |p| p.can_moderate_item_listing)?;
        let is_blocked = self.state().is(ListingStateValue::BLOCKED);
        match (blocked, is_blocked) {
            (true, false) => self.move_to(ListingStateValue::BLOCKED),
            (false, true) => self.move_to(ListingStateValue::PAUSED),
            _ => {}
        }
        Ok(())
    }

    pub fn request_delete(&mut self) -> DomainResult<()> {
        self.root
            .guard("deleted status", ITEM_LISTING, |p| p.can_delete_item_listing)?;
        self.root.props_mut().is_deleted = true;
        tracing::debug!(listing_id = %self.id(), "item listing marked for deletion");
        Ok(())
    }

    /// Fetch a fresh copy of the sharer.
    ///
    /// # Errors
    ///
    /// Propagates the repository error untouched.
    pub async fn load_sharer(&self, users: &dyn UserRepository) -> DomainResult<UserView> {
        let record = users.get_by_id(self.root.props().sharer.id()).await?;
        Ok(resolve_user_view(&record, self.root.passport()))
    }

    fn ensure_not_blocked(&self) -> DomainResult<()> {
        crate::invariant!(
            !self.state().is(ListingStateValue::BLOCKED),
            DomainError::business_rule(BLOCKED_LISTING_VIOLATION)
        );
        Ok(())
    }

    fn ensure_state_in(&self, allowed: &[&str], message: &str) -> DomainResult<()> {
        if allowed.iter().any(|state| self.state().is(state)) {
            Ok(())
        } else {
            Err(DomainError::business_rule(message))
        }
    }

    fn move_to(&mut self, to: &'static str) {
        let from = self.state().to_string();
        self.root.props_mut().state = ListingStateValue::known(to);
        tracing::debug!(listing_id = %self.id(), from = %from, to, "item listing state changed");
    }
}

impl Aggregate for ItemListing {
    fn take_integration_events(&mut self) -> Vec<IntegrationEvent> {
        self.root.take_integration_events()
    }
}

// ============================================================================
// DRAFT
// ============================================================================

/// Creation phase of an [`ItemListing`]: no Visa checks, same shape checks.
#[derive(Debug)]
pub struct ItemListingDraft {
    passport: Arc<dyn Passport>,
    id: ItemListingId,
    sharer: Option<UserRecord>,
    title: Option<Title>,
    description: Option<Description>,
    category: Option<Category>,
    location: Option<Location>,
    sharing_period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    images: Vec<String>,
    state: ListingStateValue,
}

impl ItemListingDraft {
    #[must_use]
    pub fn new(passport: Arc<dyn Passport>, id: ItemListingId) -> Self {
        Self {
            passport,
            id,
            sharer: None,
            title: None,
            description: None,
            category: None,
            location: None,
            sharing_period: None,
            images: Vec::new(),
            state: ListingStateValue::known(ListingStateValue::ACTIVE),
        }
    }

    pub fn set_sharer(&mut self, sharer: Option<UserRecord>) -> DomainResult<()> {
        self.sharer = Some(require("sharer", sharer)?);
        Ok(())
    }

    pub fn set_title(&mut self, title: Title) {
        self.title = Some(title);
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = Some(description);
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = Some(category);
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub fn set_sharing_period(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<()> {
        check_sharing_period(start, end)?;
        self.sharing_period = Some((start, end));
        Ok(())
    }

    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
    }

    /// Start the listing in `Drafted` instead of `Active`.
    pub fn set_draft(&mut self, is_draft: bool) {
        let state = if is_draft {
            ListingStateValue::DRAFTED
        } else {
            ListingStateValue::ACTIVE
        };
        self.state = ListingStateValue::known(state);
    }

    /// Direct state assignment, only available before the listing exists.
    pub fn set_state(&mut self, state: ListingStateValue) {
        self.state = state;
    }

    /// # Errors
    ///
    /// Fails with the "cannot be null" error for the first missing field.
    pub fn finalize(self) -> DomainResult<ItemListing> {
        let (sharing_period_start, sharing_period_end) =
            require("sharing period", self.sharing_period)?;
        let now = Utc::now();
        let props = ItemListingProps {
            id: self.id,
            sharer: require("sharer", self.sharer)?,
            title: require("title", self.title)?,
            description: require("description", self.description)?,
            category: require("category", self.category)?,
            location: require("location", self.location)?,
            sharing_period_start,
            sharing_period_end,
            state: self.state,
            images: self.images,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(listing_id = %props.id, state = %props.state, "item listing created");
        Ok(ItemListing::new(props, self.passport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::test_support::{
        admin_passport, listing_props, member_passport, member_props,
    };
    use crate::domain::permissions::AdminRolePermissions;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn owned_listing(state: &'static str) -> Result<ItemListing, Box<dyn std::error::Error>> {
        let alice = member_props("alice")?;
        let mut props = listing_props("listing-1", alice.clone())?;
        props.state = ListingStateValue::known(state);
        Ok(ItemListing::new(props, member_passport(&alice)))
    }

    #[test]
    fn test_owner_updates_title() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        listing.set_title(Title::new("Cordless drill, 18V")?)?;
        assert_eq!(listing.title().as_str(), "Cordless drill, 18V");
        Ok(())
    }

    #[test]
    fn test_non_owner_cannot_update() -> TestResult {
        let alice = member_props("alice")?;
        let bob = member_props("bob")?;
        let mut listing = ItemListing::new(listing_props("listing-1", alice)?, member_passport(&bob));
        let before = listing.title().clone();

        let err = listing.set_title(Title::new("Stolen drill")?).err();

        assert_eq!(err, Some(DomainError::permission_denied("title", "item listing")));
        assert_eq!(listing.title(), &before);
        Ok(())
    }

    #[test]
    fn test_direct_state_assignment_fails() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        let result = listing.set_state(ListingStateValue::new("Paused")?);
        assert!(result.is_err_and(|e| e.is_authorization()));
        assert!(listing.is_active());
        Ok(())
    }

    #[test]
    fn test_pause_then_publish() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        listing.pause()?;
        assert!(listing.state().is(ListingStateValue::PAUSED));
        listing.publish()?;
        assert!(listing.is_active());
        Ok(())
    }

    #[test]
    fn test_cancel_then_reinstate() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        listing.cancel()?;
        assert!(listing.cancel().is_err_and(|e| e.is_business_rule()));
        listing.reinstate()?;
        assert!(listing.is_active());
        Ok(())
    }

    #[test]
    fn test_blocked_listing_refuses_transitions() -> TestResult {
        let alice = member_props("alice")?;
        let props = listing_props("listing-1", alice.clone())?;
        let mut as_admin = ItemListing::new(
            props,
            admin_passport("root", AdminRolePermissions::super_admin())?,
        );
        as_admin.set_blocked(true)?;

        let mut as_owner = ItemListing::new(as_admin.props().clone(), member_passport(&alice));
        assert_eq!(
            as_owner.pause(),
            Err(DomainError::business_rule(BLOCKED_LISTING_VIOLATION))
        );

        as_admin.set_blocked(false)?;
        assert!(as_admin.state().is(ListingStateValue::PAUSED));
        Ok(())
    }

    #[test]
    fn test_owner_cannot_block() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        assert!(listing.set_blocked(true).is_err_and(|e| e.is_authorization()));
        Ok(())
    }

    #[test]
    fn test_request_delete_sets_flag() -> TestResult {
        let mut listing = owned_listing(ListingStateValue::ACTIVE)?;
        listing.request_delete()?;
        assert!(listing.is_deleted());
        Ok(())
    }

    #[test]
    fn test_new_instance_requires_sharer_and_honours_draft() -> TestResult {
        let alice = member_props("alice")?;
        let passport = member_passport(&alice);
        let template = listing_props("listing-1", alice.clone())?;
        let fields = NewItemListing {
            title: template.title.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            location: template.location.clone(),
            sharing_period_start: template.sharing_period_start,
            sharing_period_end: template.sharing_period_end,
            images: Vec::new(),
        };

        let missing = ItemListing::new_instance(
            Arc::clone(&passport),
            template.id.clone(),
            None,
            fields.clone(),
            false,
        );
        assert_eq!(missing.err(), Some(DomainError::required("sharer")));

        let drafted = ItemListing::new_instance(
            passport,
            template.id.clone(),
            Some(UserRecord::from(alice)),
            fields,
            true,
        )?;
        assert!(drafted.state().is(ListingStateValue::DRAFTED));
        Ok(())
    }

    #[test]
    fn test_sharer_view_is_fresh_each_access() -> TestResult {
        let listing = owned_listing(ListingStateValue::ACTIVE)?;
        assert_eq!(listing.sharer(), listing.sharer());
        Ok(())
    }
}
