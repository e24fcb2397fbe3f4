//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not a member: {0}")]
    NotMember(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    /// Numeric code, machine-readable slug and HTTP status for this error.
    pub fn classify(&self) -> (StatusCode, u16, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, 10001, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, 10002, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, 10003, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, 10004, "forbidden"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, 10005, "conflict"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, 10007, "validation_error"),
            AppError::NotMember(_) => (StatusCode::FORBIDDEN, 10008, "not_member"),
            AppError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, 10009, "payload_too_large")
            }
            AppError::Internal(_) | AppError::Database(_) | AppError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "internal_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.classify();

        let message = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::NotMember(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Validation(msg) => msg,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".into()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".into()
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                "Internal server error".into()
            }
        };

        let body = ErrorResponse {
            code,
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}
