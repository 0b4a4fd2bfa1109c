//! Account route handlers.
//!
//! Thin boundary over [`AccountService`]: deserialize the request, call the
//! service, wrap the typed result in the response envelope. Status-code
//! mapping lives in [`crate::error::AppError`]; nothing here inspects or
//! rewraps service errors.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use digizone_core::{Email, UserId, UserType};

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin, auth_cookie, clear_auth_cookie};
use crate::models::UserSummary;
use crate::services::accounts::{NewAccount, ProfilePatch};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body. No `Debug`: it carries a plaintext password.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    /// Checked only for admin registrations.
    pub secret_token: Option<String>,
}

/// Login request body. No `Debug`: it carries a plaintext password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Email-verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

/// Body for OTP resend and password recovery.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Profile update request body. No `Debug`: it carries plaintext passwords.
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub user_type: UserType,
}

/// Non-secret registration result.
#[derive(Debug, Serialize)]
pub struct EmailResult {
    pub email: Email,
}

/// Login result: password-stripped user plus the bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub user: UserSummary,
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account.
///
/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let registered = state
        .accounts()
        .register(NewAccount {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            user_type: payload.user_type,
            secret_token: payload.secret_token,
        })
        .await?;

    let message = match registered.user_type {
        UserType::Admin => "ADMIN account created successfully",
        UserType::Customer => "We have sent an OTP to your email, please check your inbox",
        UserType::Staff => "Account created successfully",
    };

    tracing::info!(email = %registered.email, kind = %registered.user_type, "Account registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            message,
            EmailResult {
                email: registered.email,
            },
        ),
    ))
}

/// Login with email and password.
///
/// POST /api/v1/users/login
///
/// Besides returning the token in the body, sets it as the
/// `_digi_auth_token` cookie for browser clients.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let session = state
        .accounts()
        .login(&payload.email, &payload.password)
        .await?;

    let cookie = auth_cookie(
        &session.token,
        state.accounts().tokens().ttl_seconds(),
        state.config().is_secure(),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::ok(
            "Logged in successfully",
            LoginResult {
                user: session.user,
                token: session.token,
            },
        ),
    ))
}

/// Logout by expiring the auth cookie.
///
/// POST /api/v1/users/logout
///
/// Tokens are not revoked server-side; the cookie is simply cleared.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let cookie = clear_auth_cookie(state.config().is_secure())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::message("Logged out successfully"),
    ))
}

/// Submit the emailed OTP to verify an account.
///
/// PATCH /api/v1/users/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse> {
    state
        .accounts()
        .verify_email(&payload.email, &payload.otp)
        .await?;

    Ok(ApiResponse::message(
        "Email verified successfully. You can log in now",
    ))
}

/// Regenerate the OTP and send it again.
///
/// POST /api/v1/users/resend-otp
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse> {
    let email = state.accounts().resend_otp(&payload.email).await?;

    Ok(ApiResponse::ok("OTP sent to your email", EmailResult { email }))
}

/// Replace the password with an emailed temporary one.
///
/// POST /api/v1/users/forgot-password
///
/// The temporary password travels only in the email; the response
/// deliberately carries just the address it was sent to.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse> {
    let email = state.accounts().forgot_password(&payload.email).await?;

    Ok(ApiResponse::ok(
        "A new password has been sent to your email",
        EmailResult { email },
    ))
}

/// Update the caller's name and/or password.
///
/// PATCH /api/v1/users/{id}
///
/// A user may only update their own profile; admins may update any.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    let target = UserId::new(id);

    if current.id != target && !current.user_type.is_admin() {
        return Err(AppError::Forbidden(
            "you can only update your own profile".to_owned(),
        ));
    }

    let updated = state
        .accounts()
        .update_profile(
            target,
            ProfilePatch {
                name: payload.name,
                old_password: payload.old_password,
                new_password: payload.new_password,
            },
        )
        .await?;

    Ok(ApiResponse::ok("Profile updated successfully", updated))
}

/// List accounts of a kind.
///
/// GET /api/v1/users?type=customer
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.accounts().list_by_type(query.user_type).await?;

    Ok(ApiResponse::ok("Users fetched successfully", users))
}
