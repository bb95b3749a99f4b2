use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::auth::AuthError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error response with body `{ "message": ..., "details"?: ... }`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self { status, message: message.into(), details }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "message": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Unauthenticated(m) => Self::new(StatusCode::UNAUTHORIZED, m, None),
            ServiceError::Forbidden(m) => Self::new(StatusCode::FORBIDDEN, m, None),
            ServiceError::Validation { message, details } => Self::new(StatusCode::BAD_REQUEST, message, details),
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, m, None),
            ServiceError::Conflict(m) => Self::new(StatusCode::CONFLICT, m, None),
            ServiceError::InvalidTransition(m) => Self::new(StatusCode::BAD_REQUEST, m, None),
            ServiceError::Db(m) => {
                error!(error = %m, "database failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let message = match e {
            AuthError::UnsupportedToken => "Invalid Token".to_string(),
            other => other.to_string(),
        };
        Self::new(StatusCode::UNAUTHORIZED, message, None)
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid JSON body", Some(json!({ "reason": r.body_text() })))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid query parameters", Some(json!({ "reason": r.body_text() })))
    }
}
