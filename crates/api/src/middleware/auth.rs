//! Authentication extractors and auth-cookie plumbing.
//!
//! Provides extractors for requiring an authenticated (or admin) caller in
//! route handlers. The bearer token travels in the `_digi_auth_token`
//! cookie, with an `Authorization: Bearer` fallback for non-browser
//! clients. A missing, malformed, or expired token is one and the same
//! failure - handlers never learn which.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
        request::Parts,
    },
};

use crate::error::AppError;
use crate::models::UserSummary;
use crate::services::accounts::AccountError;
use crate::state::AppState;

/// Cookie carrying the session token.
pub const AUTH_COOKIE_NAME: &str = "_digi_auth_token";

/// Extractor that requires an authenticated user.
///
/// The token is validated against the store on every request, so a deleted
/// account stops authenticating immediately. The extracted context is the
/// password-stripped summary - handlers never see the hash.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct CurrentUser(pub UserSummary);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_auth_token(&parts.headers).ok_or(AccountError::InvalidToken)?;

        let user = state.accounts().authenticate(&token).await?;

        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated admin.
pub struct RequireAdmin(pub UserSummary);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.user_type.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Pull the session token from the auth cookie or the Authorization header.
#[must_use]
pub fn extract_auth_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie_token(headers) {
        return Some(token);
    }
    extract_bearer_token(headers)
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == AUTH_COOKIE_NAME {
            return Some(val.to_owned());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

/// Build the `HttpOnly` auth cookie for a freshly issued token.
///
/// # Errors
///
/// Returns an error if the token produces an invalid header value.
pub fn auth_cookie(
    token: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the expired cookie that clears the session on logout.
///
/// # Errors
///
/// Returns an error if the header value is invalid (it never is for the
/// fixed cookie name).
pub fn clear_auth_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{AUTH_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
