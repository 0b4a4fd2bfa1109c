//! Persistence for the accounts service.
//!
//! # Database: `digizone`
//!
//! A single `users` table holds account identity: email (unique), password
//! hash, account kind, verification state, and the pending OTP pair.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p digizone-cli -- migrate
//! ```
//!
//! The service itself talks to storage only through the [`UserStore`] trait;
//! [`postgres::PgUserStore`] is the production implementation and
//! [`memory::MemoryUserStore`] backs unit tests.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use digizone_core::{Email, UserId, UserType};

use crate::models::{PendingOtp, User};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Fields for a new account record.
///
/// The password is already hashed by the time it reaches the store; the
/// plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub user_type: UserType,
    pub is_verified: bool,
    pub otp: Option<PendingOtp>,
}

/// How a partial update should treat the OTP pair.
///
/// The code and its expiry are always written or cleared together; a patch
/// can never touch one without the other.
#[derive(Debug, Clone)]
pub enum OtpPatch {
    /// Replace any pending code with a new one.
    Set(PendingOtp),
    /// Remove the pending code.
    Clear,
}

/// A partial update to an account record.
///
/// `None` fields are left untouched. Email, account kind, and id are
/// immutable after creation and so have no patch fields.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub is_verified: Option<bool>,
    pub otp: Option<OtpPatch>,
}

/// Repository of account records keyed by unique email and by id.
///
/// The store is the only shared mutable resource in the service; it is
/// expected to provide per-record atomicity for updates and to enforce the
/// email uniqueness constraint as the authoritative guard against the
/// concurrent-registration race (the service's pre-check only provides a
/// friendlier error for the common case).
#[allow(async_fn_in_trait)]
pub trait UserStore: Send + Sync {
    /// Look up an account by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persist a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the email is already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Apply a partial update and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has the given id.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError>;

    /// List all accounts of the given kind.
    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert stored nullable OTP columns into the domain pair.
///
/// A record with only one of the two columns set is corrupt: the pair is
/// written and cleared together.
pub(crate) fn otp_from_columns(
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Option<PendingOtp>, StoreError> {
    match (code, expires_at) {
        (Some(code), Some(expires_at)) => Ok(Some(PendingOtp { code, expires_at })),
        (None, None) => Ok(None),
        _ => Err(StoreError::DataCorruption(
            "otp and otp_expires_at must be set together".to_owned(),
        )),
    }
}
