//! Authentication: turning a bearer token into an [`Identity`], and the
//! access policy evaluated against it.
//!
//! Providers implement [`Authenticator`]; [`AuthManager`] tries them in order.
//! Everything downstream depends only on [`Identity`].

pub mod errors;
pub mod identity;
pub mod policy;
pub mod provider;
pub mod hmac;
pub mod jwks;
pub mod manager;

pub use errors::AuthError;
pub use hmac::HmacAuthenticator;
pub use identity::{Identity, Role, TokenClaims};
pub use jwks::JwksAuthenticator;
pub use manager::AuthManager;
pub use policy::Capability;
pub use provider::{Authenticator, TokenRules};
