//! Admin account provisioning.
//!
//! Creates admin accounts directly against the store, skipping the HTTP
//! path and its admin-secret gate. Admin accounts are verified at creation
//! and never go through the OTP flow.

use digizone_core::{Email, UserType};

use digizone_api::db::{self, NewUser, StoreError, UserStore};
use digizone_api::services::password::hash_password;

use super::{CommandError, database_url};

/// Errors specific to account provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] digizone_core::EmailError),
    #[error("password hashing failed")]
    Hash,
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("store error: {0}")]
    Store(StoreError),
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the email is malformed, already registered, or the
/// database is unreachable.
pub async fn create_account(email: &str, name: &str, password: &str) -> Result<(), ProvisionError> {
    let email = Email::parse(email)?;
    let password_hash = hash_password(password).map_err(|_| ProvisionError::Hash)?;

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url)
        .await
        .map_err(CommandError::Database)?;
    let store = db::PgUserStore::new(pool);

    let user = store
        .create(NewUser {
            name: name.to_owned(),
            email,
            password_hash,
            user_type: UserType::Admin,
            is_verified: true,
            otp: None,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ProvisionError::EmailTaken,
            other => ProvisionError::Store(other),
        })?;

    tracing::info!(id = %user.id, email = %user.email, "Admin account created");
    Ok(())
}
