//! # Aggregate Roots
//!
//! Each aggregate wraps a persisted property bag in an
//! [`AggregateRoot`](crate::domain::entity::AggregateRoot) together with the
//! passport it was loaded with and the Visa issued for it.
//!
//! ## Aggregates
//!
//! - [`ReservationRequest`] - request to borrow a listing for a period;
//!   carries the only explicit lifecycle state machine
//! - [`ItemListing`] - something a sharer offers; state moves through
//!   transition methods
//! - [`Conversation`] - thread between sharer and reserver about a listing
//! - [`PersonalUser`] / [`AdminUser`] - accounts, stored as one tagged
//!   [`UserRecord`]
//!
//! ## Construction
//!
//! Stored props are wrapped with `Aggregate::new(props, passport)`. New
//! aggregates are built through a `…Draft` whose setters skip the Visa but
//! keep every other check; `finalize()` consumes the draft and returns the
//! committed aggregate.
//!
//! ```rust,ignore
//! let mut draft = ReservationRequestDraft::new(passport, id);
//! draft.set_reservation_period_start(Some(tomorrow))?;
//! draft.set_reservation_period_end(Some(next_month))?;
//! draft.set_listing(Some(listing))?;
//! draft.set_reserver(Some(reserver))?;
//! let mut request = draft.finalize()?;
//! request.accept()?; // Visa-checked from here on
//! ```

pub mod conversation;
pub mod item_listing;
pub mod reservation_request;
pub mod role;
pub mod user;

pub use conversation::{Conversation, ConversationDraft, ConversationProps};
pub use item_listing::{ItemListing, ItemListingDraft, ItemListingProps, NewItemListing};
pub use reservation_request::{
    ReservationRequest, ReservationRequestDraft, ReservationRequestProps, ReservationRequestState,
};
pub use role::{AdminRoleProps, PersonalUserRoleProps};
pub use user::{
    resolve_user_view, AdminUser, AdminUserDraft, AdminUserProps, PersonalUser,
    PersonalUserDraft, PersonalUserProps, UserAccount, UserRecord, UserView,
};
