//! Error responses for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use releasio_common::Error;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable `x-member-id` (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed path or body (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Common(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(err) => match err {
                Error::AccessDenied(_) => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                Error::InvalidInput(_) | Error::Serialization(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT")
                }
                Error::PlanLimit(_) => (StatusCode::CONFLICT, "PLAN_LIMIT"),
                Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                    error!("Request failed: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<releasio_common::access::AccessDenied> for ApiError {
    fn from(denied: releasio_common::access::AccessDenied) -> Self {
        ApiError::Common(Error::AccessDenied(denied))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
