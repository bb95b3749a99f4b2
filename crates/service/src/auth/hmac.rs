use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header};
use tracing::instrument;

use super::errors::AuthError;
use super::identity::{Audience, Identity, TokenClaims};
use super::provider::{Authenticator, TokenRules};

/// HS256 shared-secret tokens. Also mints them, which is how local
/// development and the test suites obtain credentials.
pub struct HmacAuthenticator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    rules: TokenRules,
    ttl_secs: i64,
}

impl HmacAuthenticator {
    pub fn new(secret: &[u8], rules: TokenRules, ttl_secs: u64) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            encoding: EncodingKey::from_secret(secret),
            rules,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX / 2),
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Option<Self> {
        cfg.jwt_secret
            .as_deref()
            .map(|secret| Self::new(secret.as_bytes(), TokenRules::from_config(cfg), cfg.token_ttl_secs))
    }

    /// Mint a token for `subject` carrying `roles`, with configured issuer,
    /// audience and lifetime.
    pub fn issue(&self, subject: &str, roles: &[&str]) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: Some(subject.to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iss: self.rules.issuer.clone(),
            aud: self.rules.audience.clone().map(Audience::One),
            iat: Some(now),
            exp: Some(now + self.ttl_secs),
            ..TokenClaims::default()
        };
        self.issue_claims(&claims)
    }

    /// Sign arbitrary claims as given.
    pub fn issue_claims(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[async_trait]
impl Authenticator for HmacAuthenticator {
    #[instrument(skip_all, fields(scheme = "hmac"))]
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::HS256 {
            return Err(AuthError::UnsupportedToken);
        }
        let data = decode::<TokenClaims>(token, &self.decoding, &self.rules.validation(Algorithm::HS256))?;
        Identity::from_claims(&data.claims, &self.rules.roles_claim)
    }

    fn scheme(&self) -> &'static str { "hmac" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::Role;

    const SECRET: &[u8] = b"local-development-secret";

    fn rules() -> TokenRules {
        TokenRules { issuer: Some("http://localhost:3001/".into()), audience: Some("booking-api".into()), ..TokenRules::default() }
    }

    #[tokio::test]
    async fn issued_token_round_trips_to_identity() {
        let auth = HmacAuthenticator::new(SECRET, rules(), 3600);
        let token = auth.issue("user-1", &["operator"]).unwrap();
        let id = auth.authenticate(&token).await.unwrap();
        assert_eq!(id.subject, "user-1");
        assert!(id.has_role(Role::Operator));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = HmacAuthenticator::new(SECRET, TokenRules::default(), 3600);
        let past = Utc::now().timestamp() - 3600;
        let claims = TokenClaims { sub: Some("u".into()), exp: Some(past), ..TokenClaims::default() };
        let token = auth.issue_claims(&claims).unwrap();
        assert!(matches!(auth.authenticate(&token).await, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn token_without_exp_is_malformed() {
        let auth = HmacAuthenticator::new(SECRET, TokenRules::default(), 3600);
        let claims = TokenClaims { sub: Some("u".into()), ..TokenClaims::default() };
        let token = auth.issue_claims(&claims).unwrap();
        assert!(matches!(auth.authenticate(&token).await, Err(AuthError::Malformed(_))));
    }

    #[tokio::test]
    async fn wrong_issuer_and_audience_are_rejected() {
        let issuer = HmacAuthenticator::new(SECRET, TokenRules { issuer: Some("https://evil/".into()), ..rules() }, 3600);
        let verifier = HmacAuthenticator::new(SECRET, rules(), 3600);
        let token = issuer.issue("u", &[]).unwrap();
        assert!(matches!(verifier.authenticate(&token).await, Err(AuthError::InvalidIssuer)));

        let issuer = HmacAuthenticator::new(SECRET, TokenRules { audience: Some("other".into()), ..rules() }, 3600);
        let token = issuer.issue("u", &[]).unwrap();
        assert!(matches!(verifier.authenticate(&token).await, Err(AuthError::InvalidAudience)));
    }

    #[tokio::test]
    async fn foreign_secret_fails_signature() {
        let a = HmacAuthenticator::new(SECRET, TokenRules::default(), 3600);
        let b = HmacAuthenticator::new(b"another-secret-of-length", TokenRules::default(), 3600);
        let token = a.issue("u", &["admin"]).unwrap();
        assert!(matches!(b.authenticate(&token).await, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let a = HmacAuthenticator::new(SECRET, TokenRules::default(), 3600);
        assert!(matches!(a.authenticate("not.a.jwt").await, Err(AuthError::Malformed(_))));
    }
}
