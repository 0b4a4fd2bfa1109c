//! Shared helpers for Digizone integration tests.
//!
//! The tests in `tests/` drive a running API instance over HTTP; this crate
//! only holds the little glue they share.

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL for the accounts API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("DIGIZONE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A random email address so repeated runs never collide.
#[must_use]
pub fn random_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}
