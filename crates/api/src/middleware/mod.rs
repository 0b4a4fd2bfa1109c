//! Request middleware and extractors.

pub mod auth;

pub use auth::{AUTH_COOKIE_NAME, CurrentUser, RequireAdmin, auth_cookie, clear_auth_cookie};
