//! Account operation error types.

use thiserror::Error;

use digizone_core::EmailError;

use crate::db::StoreError;
use crate::services::mail::MailError;
use crate::services::password::HashError;
use crate::services::token::TokenIssueError;

/// The taxonomy an [`AccountError`] belongs to.
///
/// The service fails fast with a typed error at the first violated
/// precondition; the boundary layer maps each kind to a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input fields.
    Validation,
    /// The record being created already exists.
    Conflict,
    /// Privileged creation refused (admin secret mismatch).
    Authorization,
    /// Bad credentials, unverified account, invalid or expired OTP/token.
    Auth,
    /// Lookup by email/id yielded no record.
    NotFound,
    /// Store, mailer, hasher, or signer failure.
    Internal,
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Neither name nor new password supplied on a profile update.
    #[error("please provide a name or a new password")]
    MissingFields,

    /// Registration attempted with an email that already has an account.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Admin account creation without the correct admin secret.
    #[error("not allowed to create an admin account")]
    AdminSecretMismatch,

    /// Unknown email or wrong password at login. One message for both, so
    /// a caller cannot probe which addresses have accounts.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Login attempted before the email was verified.
    #[error("please verify your email first")]
    EmailNotVerified,

    /// Submitted OTP does not match the pending code.
    #[error("invalid otp")]
    InvalidOtp,

    /// Submitted OTP matched but its validity window has passed.
    #[error("otp expired")]
    OtpExpired,

    /// OTP resend requested for an account that is already verified.
    #[error("email is already verified")]
    AlreadyVerified,

    /// Old password mismatch on a password change.
    #[error("invalid current password")]
    WrongPassword,

    /// Session token missing, malformed, expired, or pointing at a user
    /// that no longer exists. Deliberately one variant for all of these.
    #[error("unauthorized")]
    InvalidToken,

    /// Lookup by email/id yielded no record.
    #[error("user not found")]
    UserNotFound,

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Email delivery failure.
    #[error("email delivery error: {0}")]
    Mail(#[from] MailError),

    /// Password hashing failure.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Token signing failure.
    #[error(transparent)]
    Token(#[from] TokenIssueError),
}

impl AccountError {
    /// Which part of the taxonomy this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail(_) | Self::MissingFields => ErrorKind::Validation,
            Self::EmailTaken => ErrorKind::Conflict,
            Self::AdminSecretMismatch => ErrorKind::Authorization,
            Self::InvalidCredentials
            | Self::EmailNotVerified
            | Self::InvalidOtp
            | Self::OtpExpired
            | Self::AlreadyVerified
            | Self::WrongPassword
            | Self::InvalidToken => ErrorKind::Auth,
            Self::UserNotFound => ErrorKind::NotFound,
            Self::Store(_) | Self::Mail(_) | Self::Hash(_) | Self::Token(_) => ErrorKind::Internal,
        }
    }
}
