//! Business logic services for the accounts API.
//!
//! # Services
//!
//! - `accounts` - Account lifecycle: registration, login, verification,
//!   recovery, profile updates
//! - `password` - Argon2id hashing and temporary-password generation
//! - `otp` - One-time verification codes
//! - `token` - Signed session tokens
//! - `mail` - Outbound transactional email

pub mod accounts;
pub mod mail;
pub mod otp;
pub mod password;
pub mod token;

pub use accounts::{AccountError, AccountService};
