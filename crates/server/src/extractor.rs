use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use service::auth::{AuthError, Identity};
use service::ServiceError;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Caller identity, if a bearer token was presented.
///
/// No `Authorization` header yields `Auth(None)` and leaves the decision to
/// the core. A header that is present but not a valid bearer token is
/// rejected with 401 right here.
pub struct Auth(pub Option<Identity>);

impl Auth {
    /// Fail with 401 unless an identity is present.
    pub fn require(&self) -> Result<&Identity, JsonApiError> {
        self.0.as_ref().ok_or_else(|| ServiceError::unauthenticated().into())
    }
}

#[async_trait]
impl FromRequestParts<ServerState> for Auth {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
            None => None,
        };
        let identity = state.auth.authenticate_header(header).await?;
        Ok(Auth(identity))
    }
}
