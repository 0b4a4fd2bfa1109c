//! Core types for Digizone.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod user_type;

pub use email::{Email, EmailError};
pub use id::*;
pub use user_type::UserType;
