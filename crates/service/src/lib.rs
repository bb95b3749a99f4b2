//! Core of the booking API: identity, access policy, the service catalog,
//! the appointment engine and the user directory.
//! - Framework independent; HTTP lives in the `server` crate.
//! - Persistence goes through repository traits, with SeaORM and in-memory
//!   implementations side by side.

pub mod errors;
pub mod pagination;
pub mod clock;
pub mod auth;
pub mod catalog;
pub mod appointments;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
