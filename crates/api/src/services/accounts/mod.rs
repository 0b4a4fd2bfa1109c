//! Account lifecycle and authentication.
//!
//! Orchestrates registration with email verification, credential login,
//! session-token validation, password recovery, and profile updates over a
//! [`UserStore`] and a [`Mailer`]. All failures are typed [`AccountError`]s
//! that propagate unmodified to the boundary layer.

mod error;

pub use error::{AccountError, ErrorKind};

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use digizone_core::{Email, UserId, UserType};

use crate::db::{NewUser, OtpPatch, StoreError, UserPatch, UserStore};
use crate::models::UserSummary;
use crate::services::mail::Mailer;
use crate::services::otp::generate_otp;
use crate::services::password::{generate_temporary_password, hash_password, verify_password};
use crate::services::token::TokenCodec;

/// A registration request.
///
/// The password arrives in plaintext and is hashed before anything else
/// happens; it must never reach the store or the logs. `Debug` is
/// implemented manually so neither the password nor the admin secret can
/// leak through formatting.
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    /// Required (and checked) only when `user_type` is admin.
    pub secret_token: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("user_type", &self.user_type)
            .field("secret_token", &self.secret_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Non-secret projection returned from a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    pub email: Email,
    pub user_type: UserType,
}

/// A successful login: the password-stripped account plus a bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserSummary,
    pub token: String,
}

/// A profile mutation request. Fields update independently; a password
/// change additionally requires the old password to re-authenticate.
/// `Debug` redacts both password fields.
#[derive(Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

impl std::fmt::Debug for ProfilePatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilePatch")
            .field("name", &self.name)
            .field("old_password", &self.old_password.as_ref().map(|_| "[REDACTED]"))
            .field("new_password", &self.new_password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// The account lifecycle service.
///
/// Generic over the store and mailer so unit tests can run against the
/// in-memory store and a recording mailer. Holds no mutable state of its
/// own; the store is the only shared mutable resource.
pub struct AccountService<S, M> {
    store: S,
    mailer: M,
    tokens: TokenCodec,
    admin_secret: SecretString,
}

impl<S: UserStore, M: Mailer> AccountService<S, M> {
    /// Create a new account service.
    pub const fn new(store: S, mailer: M, tokens: TokenCodec, admin_secret: SecretString) -> Self {
        Self {
            store,
            mailer,
            tokens,
            admin_secret,
        }
    }

    /// Access the underlying store (management tooling and tests).
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Access the mailer (tests).
    pub const fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Access the token codec (for cookie lifetimes at the boundary).
    pub const fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Register a new account.
    ///
    /// Customer accounts are created unverified with a pending OTP and
    /// receive a verification email. Admin accounts require the configured
    /// admin secret; admin and staff accounts are verified immediately and
    /// get no OTP email.
    ///
    /// # Errors
    ///
    /// - [`AccountError::InvalidEmail`] for a malformed address
    /// - [`AccountError::AdminSecretMismatch`] when the admin secret is
    ///   wrong or missing; nothing is persisted
    /// - [`AccountError::EmailTaken`] when the email already has an account,
    ///   whether caught by the pre-check or by the store's unique constraint
    pub async fn register(&self, account: NewAccount) -> Result<RegisteredAccount, AccountError> {
        let email = Email::parse(&account.email)?;

        // Hash before any persistence so the plaintext never travels further.
        let password_hash = hash_password(&account.password)?;

        if account.user_type.is_admin()
            && account.secret_token.as_deref() != Some(self.admin_secret.expose_secret())
        {
            return Err(AccountError::AdminSecretMismatch);
        }

        // Friendlier error for the common case; the store's unique index
        // remains the authoritative guard against the concurrent-create race.
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let is_verified = account.user_type.is_verified_at_creation();
        let otp = if is_verified { None } else { Some(generate_otp()) };

        let user = self
            .store
            .create(NewUser {
                name: account.name,
                email,
                password_hash,
                user_type: account.user_type,
                is_verified,
                otp: otp.clone(),
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AccountError::EmailTaken,
                other => AccountError::Store(other),
            })?;

        if let Some(otp) = otp {
            self.mailer
                .send_verification_code(&user.email, &otp.code)
                .await?;
        }

        Ok(RegisteredAccount {
            email: user.email,
            user_type: user.user_type,
        })
    }

    /// Log in with email and password, issuing a signed session token.
    ///
    /// # Errors
    ///
    /// Unknown email, malformed email, and wrong password all return
    /// [`AccountError::InvalidCredentials`] so callers cannot enumerate
    /// accounts. An unverified account fails with
    /// [`AccountError::EmailNotVerified`] regardless of the password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let email = Email::parse(email).map_err(|_| AccountError::InvalidCredentials)?;

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !user.is_verified {
            return Err(AccountError::EmailNotVerified);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;

        Ok(Session {
            user: user.summary(),
            token,
        })
    }

    /// Validate a bearer token and materialize the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidToken`] whether the token is
    /// malformed, expired, or references a user that no longer exists -
    /// all indistinguishable from an absent token.
    pub async fn authenticate(&self, token: &str) -> Result<UserSummary, AccountError> {
        let user_id = self
            .tokens
            .decode(token)
            .map_err(|_| AccountError::InvalidToken)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        Ok(user.summary())
    }

    /// Verify an email address with a pending OTP.
    ///
    /// On success the account becomes verified and the OTP pair is cleared,
    /// so the same code can never satisfy a later attempt.
    ///
    /// # Errors
    ///
    /// - [`AccountError::UserNotFound`] for an unknown email
    /// - [`AccountError::InvalidOtp`] when no code is pending or the
    ///   submitted code differs (exact string match, no normalization)
    /// - [`AccountError::OtpExpired`] for a correct code submitted at or
    ///   after its expiry instant
    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<(), AccountError> {
        let email = Email::parse(email)?;

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let pending = user.otp.ok_or(AccountError::InvalidOtp)?;

        if pending.code != otp {
            return Err(AccountError::InvalidOtp);
        }

        if pending.is_expired(Utc::now()) {
            return Err(AccountError::OtpExpired);
        }

        self.store
            .update(
                user.id,
                UserPatch {
                    is_verified: Some(true),
                    otp: Some(OtpPatch::Clear),
                    ..UserPatch::default()
                },
            )
            .await?;

        Ok(())
    }

    /// Regenerate and resend the verification OTP.
    ///
    /// The fresh code overwrites any pending one - last write wins, the old
    /// code becomes unusable immediately even if it had not expired.
    ///
    /// # Errors
    ///
    /// - [`AccountError::UserNotFound`] for an unknown email
    /// - [`AccountError::AlreadyVerified`] once the account is verified
    pub async fn resend_otp(&self, email: &str) -> Result<Email, AccountError> {
        let email = Email::parse(email)?;

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if user.is_verified {
            return Err(AccountError::AlreadyVerified);
        }

        let otp = generate_otp();

        self.store
            .update(
                user.id,
                UserPatch {
                    otp: Some(OtpPatch::Set(otp.clone())),
                    ..UserPatch::default()
                },
            )
            .await?;

        self.mailer
            .send_verification_code(&user.email, &otp.code)
            .await?;

        Ok(user.email)
    }

    /// Replace the password with a generated temporary one and email it.
    ///
    /// The temporary password is hashed before persistence and the
    /// plaintext goes out exactly once, via email. It is intentionally not
    /// part of the return value: echoing it over the request channel would
    /// defeat the out-of-band delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] for an unknown email.
    pub async fn forgot_password(&self, email: &str) -> Result<Email, AccountError> {
        let email = Email::parse(email)?;

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let temporary = generate_temporary_password();
        let password_hash = hash_password(&temporary)?;

        self.store
            .update(
                user.id,
                UserPatch {
                    password_hash: Some(password_hash),
                    ..UserPatch::default()
                },
            )
            .await?;

        self.mailer
            .send_temporary_password(&user.email, &temporary)
            .await?;

        Ok(user.email)
    }

    /// Update the display name and/or password of an account.
    ///
    /// Each field updates independently: a name-only change needs no
    /// re-authentication, a password change requires the old password.
    ///
    /// # Errors
    ///
    /// - [`AccountError::MissingFields`] when neither field is supplied
    /// - [`AccountError::UserNotFound`] for an unknown id
    /// - [`AccountError::WrongPassword`] when the old password is missing
    ///   or does not match
    pub async fn update_profile(
        &self,
        id: UserId,
        patch: ProfilePatch,
    ) -> Result<UserSummary, AccountError> {
        if patch.name.is_none() && patch.new_password.is_none() {
            return Err(AccountError::MissingFields);
        }

        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let mut store_patch = UserPatch::default();

        if let Some(new_password) = patch.new_password {
            let old_password = patch
                .old_password
                .as_deref()
                .ok_or(AccountError::WrongPassword)?;

            if !verify_password(old_password, &user.password_hash)? {
                return Err(AccountError::WrongPassword);
            }

            store_patch.password_hash = Some(hash_password(&new_password)?);
        }

        if let Some(name) = patch.name {
            store_patch.name = Some(name);
        }

        let updated = self.store.update(id, store_patch).await?;

        Ok(updated.summary())
    }

    /// List all accounts of a kind as password-stripped summaries.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Store`] if the store fails.
    pub async fn list_by_type(
        &self,
        user_type: UserType,
    ) -> Result<Vec<UserSummary>, AccountError> {
        let users = self.store.list_by_type(user_type).await?;
        Ok(users.iter().map(crate::models::User::summary).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::MemoryUserStore;
    use crate::models::PendingOtp;
    use crate::services::mail::recording::{RecordingMailer, SentMail};

    const ADMIN_SECRET: &str = "kT7wQ2xV9rM4nB8cZ1pL6sD3fG0hJ5yE";

    fn service() -> AccountService<MemoryUserStore, RecordingMailer> {
        let tokens = TokenCodec::new(&SecretString::from(
            "aQ3wE7rT1yU9iO5pA2sD8fG4hJ6kL0zX".to_owned(),
        ));
        AccountService::new(
            MemoryUserStore::new(),
            RecordingMailer::new(),
            tokens,
            SecretString::from(ADMIN_SECRET.to_owned()),
        )
    }

    fn customer(email: &str) -> NewAccount {
        NewAccount {
            name: "Alice".to_owned(),
            email: email.to_owned(),
            password: "Passw0rd!".to_owned(),
            user_type: UserType::Customer,
            secret_token: None,
        }
    }

    /// Pull the OTP a registration stored for the given email.
    async fn stored_otp(
        service: &AccountService<MemoryUserStore, RecordingMailer>,
        email: &str,
    ) -> PendingOtp {
        let email = Email::parse(email).unwrap();
        service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap()
            .otp
            .unwrap()
    }

    #[tokio::test]
    async fn test_customer_registration_persists_unverified_with_otp() {
        let service = service();
        let registered = service.register(customer("alice@example.com")).await.unwrap();
        assert_eq!(registered.email.as_str(), "alice@example.com");

        let email = Email::parse("alice@example.com").unwrap();
        let user = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap();

        assert!(!user.is_verified);
        assert_ne!(user.password_hash, "Passw0rd!");
        assert!(!user.password_hash.is_empty());

        let otp = user.otp.unwrap();
        let code: u32 = otp.code.parse().unwrap();
        assert!((100_000..1_000_000).contains(&code));

        let remaining = otp.expires_at - Utc::now();
        assert!(remaining > Duration::minutes(9));
        assert!(remaining <= Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_customer_registration_emails_the_stored_code() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        assert_eq!(
            service.mailer().sent(),
            vec![SentMail::VerificationCode {
                to: "alice@example.com".to_owned(),
                code: otp.code,
            }]
        );
    }

    #[tokio::test]
    async fn test_admin_registration_with_wrong_secret_persists_nothing() {
        let service = service();
        let account = NewAccount {
            user_type: UserType::Admin,
            secret_token: Some("wrong".to_owned()),
            ..customer("root@example.com")
        };

        let err = service.register(account).await.unwrap_err();
        assert!(matches!(err, AccountError::AdminSecretMismatch));
        assert!(service.store().is_empty());
        assert!(service.mailer().sent().is_empty());
    }

    #[tokio::test]
    async fn test_admin_registration_without_secret_fails() {
        let service = service();
        let account = NewAccount {
            user_type: UserType::Admin,
            secret_token: None,
            ..customer("root@example.com")
        };

        let err = service.register(account).await.unwrap_err();
        assert!(matches!(err, AccountError::AdminSecretMismatch));
    }

    #[tokio::test]
    async fn test_admin_registration_with_secret_is_verified_and_unmailed() {
        let service = service();
        let account = NewAccount {
            user_type: UserType::Admin,
            secret_token: Some(ADMIN_SECRET.to_owned()),
            ..customer("root@example.com")
        };

        service.register(account).await.unwrap();

        let email = Email::parse("root@example.com").unwrap();
        let user = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_verified);
        assert!(user.otp.is_none());
        assert!(service.mailer().sent().is_empty());
    }

    #[tokio::test]
    async fn test_staff_registration_skips_the_otp_flow() {
        let service = service();
        let account = NewAccount {
            user_type: UserType::Staff,
            ..customer("staff@example.com")
        };

        service.register(account).await.unwrap();

        let email = Email::parse("staff@example.com").unwrap();
        let user = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_verified);
        assert!(user.otp.is_none());
        assert!(service.mailer().sent().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let err = service
            .register(customer("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected_before_persistence() {
        let service = service();
        let err = service.register(customer("not-an-email")).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidEmail(_)));
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_verify_then_login() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        let session = service.login("alice@example.com", "Passw0rd!").await.unwrap();
        assert!(session.user.is_verified);
        assert!(!session.token.is_empty());

        // The token round-trips through per-request authentication.
        let context = service.authenticate(&session.token).await.unwrap();
        assert_eq!(context, session.user);
    }

    #[tokio::test]
    async fn test_verify_with_wrong_code_fails() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        let wrong = if otp.code == "123456" { "654321" } else { "123456" };

        let err = service
            .verify_email("alice@example.com", wrong)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidOtp));
    }

    #[tokio::test]
    async fn test_correct_code_after_expiry_fails() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        let email = Email::parse("alice@example.com").unwrap();
        let user = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap();

        // Backdate the expiry; the code itself is still the right one.
        service
            .store()
            .update(
                user.id,
                UserPatch {
                    otp: Some(OtpPatch::Set(PendingOtp {
                        code: otp.code.clone(),
                        expires_at: Utc::now() - Duration::seconds(1),
                    })),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        let err = service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::OtpExpired));
    }

    #[tokio::test]
    async fn test_verify_is_single_use() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        // The code was cleared on success; replaying it must fail.
        let err = service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidOtp));
    }

    #[tokio::test]
    async fn test_resend_supersedes_the_old_code() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let old = stored_otp(&service, "alice@example.com").await;
        service.resend_otp("alice@example.com").await.unwrap();
        let fresh = stored_otp(&service, "alice@example.com").await;

        // The old code has not expired, but the resend made it unusable.
        if old.code != fresh.code {
            let err = service
                .verify_email("alice@example.com", &old.code)
                .await
                .unwrap_err();
            assert!(matches!(err, AccountError::InvalidOtp));
        }

        service
            .verify_email("alice@example.com", &fresh.code)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_resend_after_verification_fails() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        let err = service.resend_otp("alice@example.com").await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyVerified));
    }

    #[tokio::test]
    async fn test_resend_for_unknown_email_fails() {
        let service = service();
        let err = service.resend_otp("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_never_succeeds_unverified() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();

        // Correct password, unverified account.
        let err = service
            .login("alice@example.com", "Passw0rd!")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailNotVerified));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();
        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        let wrong_password = service
            .login("alice@example.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("ghost@example.com", "Passw0rd!")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AccountError::InvalidCredentials));
        assert!(matches!(unknown_email, AccountError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage_and_orphaned_tokens() {
        let service = service();
        assert!(matches!(
            service.authenticate("not-a-token").await.unwrap_err(),
            AccountError::InvalidToken
        ));

        // A validly signed token for a user id that does not exist.
        let token = service.tokens().issue(UserId::new(999)).unwrap();
        assert!(matches!(
            service.authenticate(&token).await.unwrap_err(),
            AccountError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn test_forgot_password_rotates_hash_and_emails_plaintext_once() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();
        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        let email = Email::parse("alice@example.com").unwrap();
        let before = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap()
            .password_hash;

        service.forgot_password("alice@example.com").await.unwrap();

        let after = service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap()
            .password_hash;
        assert_ne!(before, after);

        // The plaintext went out exactly once, via the mail channel only.
        let temporary = match service.mailer().sent().last().unwrap() {
            SentMail::TemporaryPassword { to, password } => {
                assert_eq!(to, "alice@example.com");
                password.clone()
            }
            other => panic!("unexpected mail: {other:?}"),
        };
        assert!(!after.contains(&temporary));

        // The old password stops working and the temporary one logs in.
        assert!(matches!(
            service
                .login("alice@example.com", "Passw0rd!")
                .await
                .unwrap_err(),
            AccountError::InvalidCredentials
        ));
        service.login("alice@example.com", &temporary).await.unwrap();
    }

    #[tokio::test]
    async fn test_forgot_password_for_unknown_email_fails() {
        let service = service();
        let err = service
            .forgot_password("ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    async fn registered_user_id(
        service: &AccountService<MemoryUserStore, RecordingMailer>,
        email: &str,
    ) -> UserId {
        service.register(customer(email)).await.unwrap();
        let email = Email::parse(email).unwrap();
        service
            .store()
            .find_by_email(&email)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_update_with_no_fields_fails() {
        let service = service();
        let id = registered_user_id(&service, "alice@example.com").await;

        let err = service
            .update_profile(id, ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::MissingFields));
    }

    #[tokio::test]
    async fn test_name_only_update_needs_no_old_password() {
        let service = service();
        let id = registered_user_id(&service, "alice@example.com").await;

        let summary = service
            .update_profile(
                id,
                ProfilePatch {
                    name: Some("Alice Cooper".to_owned()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.name, "Alice Cooper");
    }

    #[tokio::test]
    async fn test_password_change_requires_matching_old_password() {
        let service = service();
        let id = registered_user_id(&service, "alice@example.com").await;

        let err = service
            .update_profile(
                id,
                ProfilePatch {
                    new_password: Some("NewPassw0rd!".to_owned()),
                    old_password: Some("wrong".to_owned()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::WrongPassword));

        // Missing old password is the same failure.
        let err = service
            .update_profile(
                id,
                ProfilePatch {
                    new_password: Some("NewPassw0rd!".to_owned()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::WrongPassword));
    }

    #[tokio::test]
    async fn test_password_change_persists_and_old_password_stops_working() {
        let service = service();
        let id = registered_user_id(&service, "alice@example.com").await;
        let otp = stored_otp(&service, "alice@example.com").await;
        service
            .verify_email("alice@example.com", &otp.code)
            .await
            .unwrap();

        service
            .update_profile(
                id,
                ProfilePatch {
                    new_password: Some("NewPassw0rd!".to_owned()),
                    old_password: Some("Passw0rd!".to_owned()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service
                .login("alice@example.com", "Passw0rd!")
                .await
                .unwrap_err(),
            AccountError::InvalidCredentials
        ));
        service
            .login("alice@example.com", "NewPassw0rd!")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_for_unknown_id_fails() {
        let service = service();
        let err = service
            .update_profile(
                UserId::new(404),
                ProfilePatch {
                    name: Some("Nobody".to_owned()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    #[tokio::test]
    async fn test_list_by_type_returns_stripped_summaries() {
        let service = service();
        service.register(customer("alice@example.com")).await.unwrap();
        service.register(customer("bob@example.com")).await.unwrap();
        service
            .register(NewAccount {
                user_type: UserType::Staff,
                ..customer("staff@example.com")
            })
            .await
            .unwrap();

        let customers = service.list_by_type(UserType::Customer).await.unwrap();
        assert_eq!(customers.len(), 2);

        let staff = service.list_by_type(UserType::Staff).await.unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].email.as_str(), "staff@example.com");
    }
}
