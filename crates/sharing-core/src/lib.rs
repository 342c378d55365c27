//! # Sharing Core
//!
//! Domain layer of a peer-to-peer sharing marketplace: listings,
//! conversations and reservation requests, mutated only through a
//! capability-scoped Passport/Visa kernel.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`DomainResult`]. Authorization and
//! business-rule failures are separate [`DomainError`] variants and are
//! never swallowed inside the crate.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
mod error;
pub mod telemetry;

pub use config::{load_config, ConfigError, DomainConfig};
pub use domain::aggregates::{
    resolve_user_view, AdminUser, Conversation, ItemListing, PersonalUser, ReservationRequest,
    ReservationRequestState, UserRecord, UserView,
};
pub use domain::entity::Aggregate;
pub use domain::events::IntegrationEvent;
pub use domain::passport::{
    AdminUserPassport, Passport, PersonalUserPassport, SystemPassport, TrustedContext, Visa,
};
pub use domain::repository::{prepare_for_save, RepositoryError, RepositoryResult};
pub use error::{DomainError, DomainResult, ValidationError};
