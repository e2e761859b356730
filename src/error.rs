//! Error types shared by the backend adapters and the HTTP handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// BackendError
///
/// Failure of a call to the external collaborator (Supabase Postgres, Auth or Storage).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("auth service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// AppError
///
/// Handler-level error that renders as a JSON body with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Administrator access required")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
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
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            // Supabase Auth answers 4xx for bad credentials, duplicate emails, weak passwords.
            AppError::Backend(BackendError::Rejected { status, message })
                if (400..500).contains(status) =>
            {
                (StatusCode::BAD_REQUEST, "auth_rejected", Some(message.clone()))
            }
            AppError::Backend(BackendError::Timeout) => {
                tracing::error!("Backend timeout");
                (StatusCode::GATEWAY_TIMEOUT, "backend_timeout", None)
            }
            AppError::Backend(err @ BackendError::Database(_)) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Backend(err) => {
                tracing::error!(error = %err, "Backend error");
                (StatusCode::BAD_GATEWAY, "backend_error", None)
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
