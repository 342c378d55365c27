//! Domain layer of the sharing marketplace.
//!
//! - [`passport`] - Passport/Visa authorization kernel
//! - [`permissions`] - permission structs and role tables
//! - [`entity`] - guarded aggregate root
//! - [`aggregates`] - listings, conversations, reservation requests, users
//! - [`values`] / [`identifiers`] - validated value objects
//! - [`events`] - integration events queued on save
//! - [`repository`] - persistence collaborator interfaces

pub mod aggregates;
pub mod entity;
pub mod events;
pub mod identifiers;
pub mod macros;
pub mod passport;
pub mod permissions;
pub mod repository;
pub mod values;
