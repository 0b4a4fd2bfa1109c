//! One-time verification codes.

use chrono::{Duration, Utc};

use crate::models::PendingOtp;

/// How long a verification code stays valid.
const OTP_TTL_MINUTES: i64 = 10;

/// Generate a fresh verification code with its expiry instant.
///
/// Codes are uniform six-digit numbers; the expiry is evaluated lazily when
/// the code is submitted, never by a background sweep.
#[must_use]
pub fn generate_otp() -> PendingOtp {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);

    PendingOtp {
        code: code.to_string(),
        expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format() {
        let otp = generate_otp();
        assert_eq!(otp.code.len(), 6);
        assert!(otp.code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_otp().code.parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[test]
    fn test_expiry_window() {
        let before = Utc::now();
        let otp = generate_otp();
        let after = Utc::now();

        assert!(otp.expires_at >= before + Duration::minutes(OTP_TTL_MINUTES));
        assert!(otp.expires_at <= after + Duration::minutes(OTP_TTL_MINUTES));
        assert!(!otp.is_expired(Utc::now()));
    }
}
