//! Domain models for the accounts service.

pub mod user;

pub use user::{PendingOtp, User, UserSummary};
