use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::{AccessDenied, PasswordError};
use crate::models::ValidationError;

/// Failure of a client-side service call.
///
/// Local and remote implementations report through the same kinds, so a
/// caller can match on `NotFound` or `Conflict` without knowing the transport.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// Any other non-success HTTP status
    #[error("server responded {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Maps an HTTP error status to the shared vocabulary, keeping the
    /// server's message
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ServiceError::Validation(message),
            StatusCode::UNAUTHORIZED => ServiceError::Unauthorized(message),
            StatusCode::FORBIDDEN => ServiceError::Forbidden(message),
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            StatusCode::CONFLICT => ServiceError::Conflict(message),
            other => ServiceError::Remote {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Stable identifier for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Remote { .. } => "REMOTE_ERROR",
            ServiceError::Transport(_) => "TRANSPORT_ERROR",
            ServiceError::Storage(_) => "STORAGE_ERROR",
            ServiceError::Json(_) => "INVALID_JSON",
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        ServiceError::Storage(err.to_string())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.message)
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(err: AccessDenied) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Storage(err.to_string())
    }
}
