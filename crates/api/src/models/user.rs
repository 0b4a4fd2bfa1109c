//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. The full [`User`] record carries the password hash and is never
//! serialized; everything that crosses the HTTP boundary goes through the
//! password-stripped [`UserSummary`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use digizone_core::{Email, UserId, UserType};

/// A pending email-verification code.
///
/// The code and its expiry always travel together: a record either has a
/// pending verification or it has none. Expiry is evaluated lazily when a
/// code is submitted; nothing sweeps expired codes in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    /// Six-digit numeric code, stored as text for exact comparison.
    pub code: String,
    /// Instant at which the code stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    /// Returns true once the current time has reached the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A Digizone account (domain type).
///
/// Owned by the user store; other components hold it only transiently.
/// Deliberately not `Serialize` - the password hash must never leave the
/// service, so responses are built from [`UserSummary`] instead.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID, immutable after creation.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address; the natural key for lookups.
    pub email: Email,
    /// Argon2id PHC-string hash of the password. Never the plaintext.
    pub password_hash: String,
    /// Account kind, fixed at creation.
    pub user_type: UserType,
    /// Whether the email has been verified.
    pub is_verified: bool,
    /// Pending verification code, present only while verification is open.
    pub otp: Option<PendingOtp>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Project the account into its password-stripped form.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            user_type: self.user_type,
            is_verified: self.is_verified,
        }
    }
}

/// Password-stripped projection of an account.
///
/// This is both the response shape for account operations and the
/// authenticated-user context handed to protected handlers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub is_verified: bool,
}
