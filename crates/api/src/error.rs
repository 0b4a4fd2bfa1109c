//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps typed account errors onto
//! transport statuses and captures internal failures to Sentry before
//! responding. All route handlers return `Result<T, AppError>`. Account
//! errors arrive here unmodified - no layer in between rewraps them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::accounts::{AccountError, ErrorKind};

/// Application-level error type for the accounts API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Typed failure from the account service.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Authenticated caller lacks the required privileges.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Something went wrong assembling the response.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Transport status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Account(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Auth => StatusCode::UNAUTHORIZED,
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error should be captured to Sentry.
    fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = if self.is_internal() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
