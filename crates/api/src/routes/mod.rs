//! HTTP route handlers for the accounts API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (database ping)
//!
//! # Accounts
//! POST  /api/v1/users                 - Register an account
//! GET   /api/v1/users?type=           - List accounts by kind (admin only)
//! POST  /api/v1/users/login           - Login, sets the auth cookie
//! POST  /api/v1/users/logout          - Clears the auth cookie
//! PATCH /api/v1/users/verify-email    - Submit the emailed OTP
//! POST  /api/v1/users/resend-otp      - Regenerate and resend the OTP
//! POST  /api/v1/users/forgot-password - Email a temporary password
//! PATCH /api/v1/users/{id}            - Update name/password (own account,
//!                                       or any account for admins)
//! ```
//!
//! Every success response carries the `{success, message, result}` envelope;
//! failures go through [`crate::error::AppError`] which maps the error kind
//! to a status code.

pub mod users;

use axum::{
    Json, Router,
    routing::{patch, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Success envelope wrapped around every response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response with a result payload.
    pub fn ok(message: impl Into<String>, result: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            result: Some(result),
        })
    }
}

impl ApiResponse<()> {
    /// A successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            result: None,
        })
    }
}

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/verify-email", patch(users::verify_email))
        .route("/resend-otp", post(users::resend_otp))
        .route("/forgot-password", post(users::forgot_password))
        .route("/{id}", patch(users::update_profile))
}

/// Create all routes for the accounts API.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/v1/users", user_routes())
}
