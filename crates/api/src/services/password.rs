//! Password hashing and credential generation.
//!
//! Hashing uses Argon2id with a per-password random salt; verification goes
//! through `argon2`'s constant-time comparison. The plaintext never leaves
//! this module's callers - only PHC-format hash strings are stored.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::distr::{Alphanumeric, SampleString};

/// Length of generated temporary passwords.
///
/// 16 alphanumeric characters carry ~95 bits of entropy, comfortably above
/// the 80-bit floor required for recovery credentials.
const TEMP_PASSWORD_LENGTH: usize = 16;

/// Password hashing failed for reasons other than a mismatch.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed")]
pub struct HashError;

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns [`HashError`] if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| HashError)
}

/// Verify a password against a stored PHC-string hash.
///
/// Returns `Ok(false)` on a mismatch; the comparison itself is constant-time.
///
/// # Errors
///
/// Returns [`HashError`] if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| HashError)?;
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(HashError),
    }
}

/// Generate a random alphanumeric temporary password for account recovery.
#[must_use]
pub fn generate_temporary_password() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), TEMP_PASSWORD_LENGTH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert!(verify_password("Passw0rd!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("Passw0rd!").unwrap();
        let b = hash_password("Passw0rd!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert!(!hash.is_empty());
        assert!(!hash.contains("Passw0rd!"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_temporary_password_shape() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMP_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_temporary_passwords_differ() {
        assert_ne!(generate_temporary_password(), generate_temporary_password());
    }
}
