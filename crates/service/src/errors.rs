use thiserror::Error;

use crate::auth::errors::AuthError;

/// Failures surfaced by the core. Each variant maps to exactly one HTTP status
/// at the edge; nothing here is retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{message}")]
    Validation { message: String, details: Option<serde_json::Value> },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn unauthenticated() -> Self { Self::Unauthenticated("Unauthorized".into()) }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), details: None }
    }

    /// Validation failure pointing at a single input field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), details: Some(serde_json::json!({ "field": field })) }
    }

    /// Stable numeric code for logs.
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Unauthenticated(_) => 2001,
            ServiceError::Forbidden(_) => 2002,
            ServiceError::Validation { .. } => 2003,
            ServiceError::NotFound(_) => 2004,
            ServiceError::Conflict(_) => 2005,
            ServiceError::InvalidTransition(_) => 2006,
            ServiceError::Db(_) => 2100,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(m) => Self::validation(m),
            models::errors::ModelError::Db(e) => Self::Db(e.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self { Self::Unauthenticated(e.to_string()) }
}
