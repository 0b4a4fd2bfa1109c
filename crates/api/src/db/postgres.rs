//! `PostgreSQL` implementation of the user store.
//!
//! Queries are bound at runtime and mapped through a `FromRow` row type,
//! then converted into the validated domain model via `TryFrom`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use digizone_core::{Email, UserId, UserType};

use super::{NewUser, OtpPatch, StoreError, UserPatch, UserStore, otp_from_columns};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, user_type, is_verified, \
     otp, otp_expires_at, created_at, updated_at";

/// `PostgreSQL`-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new store over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    user_type: String,
    is_verified: bool,
    otp: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let user_type: UserType = row.user_type.parse().map_err(|e| {
            StoreError::DataCorruption(format!("invalid user type in database: {e}"))
        })?;

        let otp = otp_from_columns(row.otp, row.otp_expires_at)?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
            user_type,
            is_verified: row.is_verified,
            otp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a sqlx error, turning unique violations into [`StoreError::Conflict`].
fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict("email already exists".to_owned());
    }
    StoreError::Database(e)
}

impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let (otp_code, otp_expires_at) = match &new_user.otp {
            Some(pending) => (Some(pending.code.clone()), Some(pending.expires_at)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, user_type, is_verified, otp, otp_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.name)
        .bind(new_user.email.as_str())
        .bind(&new_user.password_hash)
        .bind(new_user.user_type.to_string())
        .bind(new_user.is_verified)
        .bind(otp_code)
        .bind(otp_expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        row.try_into()
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        // The OTP pair is written atomically: $5 decides whether the pair is
        // touched at all, $6/$7 carry the new values (both NULL for a clear).
        let (touch_otp, otp_code, otp_expires_at) = match &patch.otp {
            Some(OtpPatch::Set(pending)) => {
                (true, Some(pending.code.clone()), Some(pending.expires_at))
            }
            Some(OtpPatch::Clear) => (true, None, None),
            None => (false, None, None),
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                password_hash = COALESCE($3, password_hash), \
                is_verified = COALESCE($4, is_verified), \
                otp = CASE WHEN $5 THEN $6 ELSE otp END, \
                otp_expires_at = CASE WHEN $5 THEN $7 ELSE otp_expires_at END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(patch.name)
        .bind(patch.password_hash)
        .bind(patch.is_verified)
        .bind(touch_otp)
        .bind(otp_code)
        .bind(otp_expires_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map_or(Err(StoreError::NotFound), TryInto::try_into)
    }

    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_type = $1 ORDER BY created_at ASC"
        ))
        .bind(user_type.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
