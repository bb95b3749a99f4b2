use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};

use super::errors::AuthError;
use super::identity::Identity;

/// One way of turning a bearer token into an [`Identity`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify the token. Return `UnsupportedToken` when this provider does not
    /// handle the token's algorithm so the next one can try.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;

    /// Name of this auth scheme (for debugging/logging)
    fn scheme(&self) -> &'static str;
}

/// Standard-claim expectations shared by every provider.
#[derive(Clone, Debug)]
pub struct TokenRules {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub roles_claim: String,
}

impl Default for TokenRules {
    fn default() -> Self {
        Self { issuer: None, audience: None, roles_claim: "https://booking-api/roles".into() }
    }
}

impl TokenRules {
    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self { issuer: cfg.issuer.clone(), audience: cfg.audience.clone(), roles_claim: cfg.roles_claim.clone() }
    }

    /// `exp` is mandatory; `iss`/`aud` are checked only when configured.
    pub fn validation(&self, alg: Algorithm) -> Validation {
        let mut v = Validation::new(alg);
        v.set_required_spec_claims(&["exp"]);
        v.validate_nbf = true;
        match &self.issuer {
            Some(iss) => v.set_issuer(&[iss.as_str()]),
            None => v.iss = None,
        }
        match &self.audience {
            Some(aud) => v.set_audience(&[aud.as_str()]),
            None => v.validate_aud = false,
        }
        v
    }
}
