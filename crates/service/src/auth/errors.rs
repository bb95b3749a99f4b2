use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Token verification failures. All of them end up as 401 at the edge,
/// except `UnsupportedToken` which only steers the provider chain.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed Authorization header")]
    MalformedHeader,
    #[error("no authenticator accepts this token")]
    UnsupportedToken,
    #[error("Token expired (exp)")]
    Expired,
    #[error("Token not yet valid (nbf)")]
    NotYetValid,
    #[error("Invalid token issuer (iss)")]
    InvalidIssuer,
    #[error("Invalid token audience (aud)")]
    InvalidAudience,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Invalid token: missing sub")]
    MissingSubject,
    #[error("Invalid token: no matching signing key")]
    UnknownKey,
    #[error("Invalid token: {0}")]
    Malformed(String),
    #[error("key set error: {0}")]
    KeySet(String),
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::MalformedHeader => 1001,
            AuthError::UnsupportedToken => 1002,
            AuthError::Expired => 1003,
            AuthError::NotYetValid => 1004,
            AuthError::InvalidIssuer => 1005,
            AuthError::InvalidAudience => 1006,
            AuthError::InvalidSignature => 1007,
            AuthError::MissingSubject => 1008,
            AuthError::UnknownKey => 1009,
            AuthError::Malformed(_) => 1010,
            AuthError::KeySet(_) => 1101,
            AuthError::TokenError(_) => 1102,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::MissingRequiredClaim(claim) => AuthError::Malformed(format!("missing {claim}")),
            _ => AuthError::Malformed(e.to_string()),
        }
    }
}
