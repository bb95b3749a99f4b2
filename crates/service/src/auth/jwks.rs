use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey};
use tracing::{info, instrument};

use super::errors::AuthError;
use super::identity::{Identity, TokenClaims};
use super::provider::{Authenticator, TokenRules};

/// RSA-signed tokens from an external identity provider, verified against
/// its published JSON Web Key Set.
pub struct JwksAuthenticator {
    keys: JwkSet,
    rules: TokenRules,
}

impl JwksAuthenticator {
    pub fn new(keys: JwkSet, rules: TokenRules) -> Self { Self { keys, rules } }

    /// Download the key set once. Keys are not refreshed afterwards.
    #[instrument(skip(rules))]
    pub async fn fetch(jwks_uri: &str, rules: TokenRules) -> Result<Self, AuthError> {
        let keys = reqwest::get(jwks_uri)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySet(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySet(e.to_string()))?;
        info!(keys = keys.keys.len(), "jwks_loaded");
        Ok(Self::new(keys, rules))
    }

    pub fn key_count(&self) -> usize { self.keys.keys.len() }
}

#[async_trait]
impl Authenticator for JwksAuthenticator {
    #[instrument(skip_all, fields(scheme = "jwks"))]
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let header = decode_header(token)?;
        if !matches!(header.alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512) {
            return Err(AuthError::UnsupportedToken);
        }
        let jwk = match header.kid.as_deref() {
            Some(kid) => self.keys.find(kid),
            None => self.keys.keys.first(),
        }
        .ok_or(AuthError::UnknownKey)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeySet(e.to_string()))?;
        let data = decode::<TokenClaims>(token, &key, &self.rules.validation(header.alg))?;
        Identity::from_claims(&data.claims, &self.rules.roles_claim)
    }

    fn scheme(&self) -> &'static str { "jwks" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hmac::HmacAuthenticator;
    use crate::auth::identity::{Audience, Role};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const PRIVATE_PEM: &str = include_str!("testdata/rsa_private.pem");
    const JWKS: &str = include_str!("testdata/jwks.json");
    const NS: &str = "https://booking-api/roles";

    fn rules() -> TokenRules {
        TokenRules { issuer: Some("https://idp.example.com/".into()), audience: Some("booking-api".into()), ..TokenRules::default() }
    }

    fn authenticator() -> JwksAuthenticator {
        JwksAuthenticator::new(serde_json::from_str(JWKS).unwrap(), rules())
    }

    fn sign(kid: Option<&str>, claims: &TokenClaims) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        encode(&header, claims, &EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap()).unwrap()
    }

    fn provider_claims() -> TokenClaims {
        let mut claims = TokenClaims {
            sub: Some("auth0|abc".into()),
            iss: Some("https://idp.example.com/".into()),
            aud: Some(Audience::Many(vec!["booking-api".into(), "https://idp.example.com/userinfo".into()])),
            exp: Some(Utc::now().timestamp() + 600),
            permissions: vec!["manage:appointments".into()],
            ..TokenClaims::default()
        };
        claims.extra.insert(NS.into(), serde_json::json!(["user"]));
        claims
    }

    #[tokio::test]
    async fn verifies_rs256_token_by_kid() {
        let auth = authenticator();
        assert_eq!(auth.key_count(), 1);
        let id = auth.authenticate(&sign(Some("test-key-1"), &provider_claims())).await.unwrap();
        assert_eq!(id.subject, "auth0|abc");
        assert!(id.has_role(Role::Operator));
        assert!(id.has_role(Role::User));
    }

    #[tokio::test]
    async fn falls_back_to_first_key_without_kid() {
        let id = authenticator().authenticate(&sign(None, &provider_claims())).await.unwrap();
        assert_eq!(id.subject, "auth0|abc");
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let res = authenticator().authenticate(&sign(Some("rotated"), &provider_claims())).await;
        assert!(matches!(res, Err(AuthError::UnknownKey)));
    }

    #[tokio::test]
    async fn hmac_tokens_are_not_ours() {
        let hmac = HmacAuthenticator::new(b"local-development-secret", TokenRules::default(), 60);
        let token = hmac.issue("u", &["admin"]).unwrap();
        assert!(matches!(authenticator().authenticate(&token).await, Err(AuthError::UnsupportedToken)));
    }

    #[tokio::test]
    async fn audience_mismatch_is_rejected() {
        let mut claims = provider_claims();
        claims.aud = Some(Audience::One("someone-else".into()));
        let res = authenticator().authenticate(&sign(Some("test-key-1"), &claims)).await;
        assert!(matches!(res, Err(AuthError::InvalidAudience)));
    }
}
