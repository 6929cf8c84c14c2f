// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// The terminal operator sees the `details` string, so the state-conflict
/// variants carry messages specific enough to decide between retry and
/// escalation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("This card is not registered")]
    UnknownCard,

    #[error("Already clocked in; an open attendance session exists")]
    AlreadyClockedIn,

    #[error("This attendance session was already closed")]
    AlreadyClockedOut,

    #[error("No open attendance session to close")]
    NoOpenSession,

    #[error("Invalid metrics: {0}")]
    InvalidMetrics(String),

    #[error("The staff management system rejected the credentials")]
    ExternalAuthFailed,

    #[error("Staff API error: {0}")]
    ExternalApi(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::UnknownCard => (
                StatusCode::NOT_FOUND,
                "unknown_card",
                Some(self.to_string()),
            ),
            AppError::AlreadyClockedIn => (
                StatusCode::CONFLICT,
                "already_clocked_in",
                Some(self.to_string()),
            ),
            AppError::AlreadyClockedOut => (
                StatusCode::CONFLICT,
                "already_clocked_out",
                Some(self.to_string()),
            ),
            AppError::NoOpenSession => (
                StatusCode::CONFLICT,
                "no_open_session",
                Some(self.to_string()),
            ),
            AppError::InvalidMetrics(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_metrics", Some(msg.clone()))
            }
            AppError::ExternalAuthFailed => (
                StatusCode::UNAUTHORIZED,
                "external_auth_failed",
                Some(self.to_string()),
            ),
            AppError::ExternalApi(msg) => {
                (StatusCode::BAD_GATEWAY, "staff_api_error", Some(msg.clone()))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
