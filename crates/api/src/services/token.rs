//! Signed session tokens.
//!
//! A successful login is materialized as an HS256 JWT carrying the user id
//! and an expiry. The payload is a defined claims struct validated on
//! decode - never a trusted untyped value. Decode failures, expiry, and a
//! missing token are deliberately indistinguishable to callers.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use digizone_core::UserId;

/// How long an issued token stays valid.
const TOKEN_TTL_HOURS: i64 = 24;

/// Token issuance failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to sign session token")]
pub struct TokenIssueError(#[source] jsonwebtoken::errors::Error);

/// Token was missing, malformed, tampered with, or expired.
#[derive(Debug, thiserror::Error)]
#[error("invalid session token")]
pub struct TokenDecodeError;

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id, as a string subject.
    sub: String,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// Signs user ids into bearer tokens and verifies them back.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Seconds until a freshly issued token expires. Used for cookie Max-Age.
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a signed token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssueError`] if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenIssueError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenIssueError)
    }

    /// Verify a token and extract the embedded user id.
    ///
    /// # Errors
    ///
    /// Returns [`TokenDecodeError`] on any failure - bad signature, garbage
    /// input, expired token, or a subject that is not a user id. Callers
    /// cannot tell these apart, matching the contract that an invalid token
    /// behaves exactly like an absent one.
    pub fn decode(&self, token: &str) -> Result<UserId, TokenDecodeError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| TokenDecodeError)?;

        let id: i32 = data.claims.sub.parse().map_err(|_| TokenDecodeError)?;
        Ok(UserId::new(id))
    }
}
