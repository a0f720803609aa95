use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::clients::GenError;
use crate::db::StorageError;
use crate::services::AuthError;

#[derive(Debug)]
pub enum ApiError {
    /// The generative service asked us to back off; users are told to
    /// wait, distinctly from generic failure.
    RateLimited(String),

    /// Generic upstream generation failure.
    GenerationFailed(String),

    /// The store rejected a write for capacity reasons. Already-returned
    /// results stay valid.
    StorageFull(String),

    ValidationError(String),

    Unauthorized(String),

    Conflict(String),

    NotFound(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            ApiError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            ApiError::StorageFull(msg) => write!(f, "Storage full: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            ApiError::GenerationFailed(msg) => {
                tracing::warn!("Generation failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            ApiError::StorageFull(msg) => (StatusCode::INSUFFICIENT_STORAGE, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<GenError> for ApiError {
    fn from(err: GenError) -> Self {
        match err {
            GenError::RateLimited => ApiError::RateLimited(
                "Request limit exceeded. Please wait and try again.".to_string(),
            ),
            GenError::Upstream { status, message } => {
                tracing::warn!(status, message, "generative service error");
                ApiError::GenerationFailed("Generation failed. Please try again.".to_string())
            }
            GenError::Empty => {
                ApiError::GenerationFailed("The service returned no content. Please try again.".to_string())
            }
            GenError::Http(e) => {
                tracing::warn!(error = %e, "generative service request failed");
                ApiError::GenerationFailed("Generation failed. Please try again.".to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Full => ApiError::StorageFull(
                "Could not save. Storage might be full.".to_string(),
            ),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail | AuthError::EmailInUse => {
                ApiError::Conflict(err.to_string())
            }
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::NotFound => ApiError::NotFound(err.to_string()),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Storage(e) => e.into(),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
