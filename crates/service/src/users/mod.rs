//! User directory administered by admins; each user may read and edit
//! their own record.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::UserService;
