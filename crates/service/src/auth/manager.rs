use std::sync::Arc;

use tracing::{debug, instrument, trace};

use super::errors::AuthError;
use super::identity::Identity;
use super::provider::Authenticator;

/// Tries each registered authenticator in order.
///
/// An authenticator answering `UnsupportedToken` passes the token on; any other
/// error stops the chain.
#[derive(Clone, Default)]
pub struct AuthManager {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl AuthManager {
    pub fn new() -> Self { Self::default() }

    pub fn with_authenticator<A: Authenticator + 'static>(mut self, authenticator: A) -> Self {
        self.authenticators.push(Arc::new(authenticator));
        self
    }

    pub fn is_empty(&self) -> bool { self.authenticators.is_empty() }

    pub fn schemes(&self) -> Vec<&'static str> { self.authenticators.iter().map(|a| a.scheme()).collect() }

    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        for authenticator in &self.authenticators {
            trace!(scheme = authenticator.scheme(), "trying authenticator");
            match authenticator.authenticate(token).await {
                Ok(identity) => {
                    debug!(scheme = authenticator.scheme(), sub = %identity.subject, "auth succeeded");
                    return Ok(identity);
                }
                Err(AuthError::UnsupportedToken) => continue,
                Err(e) => {
                    debug!(scheme = authenticator.scheme(), error = %e, "auth failed");
                    return Err(e);
                }
            }
        }
        Err(AuthError::UnsupportedToken)
    }

    /// Resolve an `Authorization` header value. No header means no identity;
    /// anything other than a non-empty `Bearer` token is an error.
    pub async fn authenticate_header(&self, header: Option<&str>) -> Result<Option<Identity>, AuthError> {
        let Some(value) = header else { return Ok(None) };
        let token = bearer_token(value).ok_or(AuthError::MalformedHeader)?;
        self.authenticate(token).await.map(Some)
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hmac::HmacAuthenticator;
    use crate::auth::identity::Role;
    use crate::auth::jwks::JwksAuthenticator;
    use crate::auth::provider::TokenRules;

    fn manager() -> (AuthManager, HmacAuthenticator) {
        let jwks = JwksAuthenticator::new(serde_json::from_str(include_str!("testdata/jwks.json")).unwrap(), TokenRules::default());
        let hmac = HmacAuthenticator::new(b"local-development-secret", TokenRules::default(), 600);
        let minter = HmacAuthenticator::new(b"local-development-secret", TokenRules::default(), 600);
        (AuthManager::new().with_authenticator(jwks).with_authenticator(hmac), minter)
    }

    #[tokio::test]
    async fn chain_skips_unsupported_providers() {
        let (mgr, minter) = manager();
        assert_eq!(mgr.schemes(), vec!["jwks", "hmac"]);
        let token = minter.issue("u-9", &["admin"]).unwrap();
        let id = mgr.authenticate(&token).await.unwrap();
        assert!(id.has_role(Role::Admin));
    }

    #[tokio::test]
    async fn header_handling() {
        let (mgr, minter) = manager();
        assert!(mgr.authenticate_header(None).await.unwrap().is_none());
        assert!(matches!(mgr.authenticate_header(Some("Basic abc")).await, Err(AuthError::MalformedHeader)));
        assert!(matches!(mgr.authenticate_header(Some("Bearer   ")).await, Err(AuthError::MalformedHeader)));
        let token = minter.issue("u-1", &[]).unwrap();
        let id = mgr.authenticate_header(Some(&format!("bearer {token}"))).await.unwrap().unwrap();
        assert_eq!(id.subject, "u-1");
    }

    #[tokio::test]
    async fn empty_chain_accepts_nothing() {
        let (_, minter) = manager();
        let token = minter.issue("u", &[]).unwrap();
        assert!(matches!(AuthManager::new().authenticate(&token).await, Err(AuthError::UnsupportedToken)));
    }
}
