//! In-memory implementation of the user store.
//!
//! Backs unit tests so the service logic can be exercised without a running
//! `PostgreSQL` instance. Enforces the same email uniqueness and not-found
//! semantics as the real store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use digizone_core::{Email, UserId, UserType};

use super::{NewUser, OtpPatch, StoreError, UserPatch, UserStore};
use crate::models::User;

/// Mutex-held map of account records, keyed by id.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i32, User>,
    next_id: i32,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held. Used by tests to assert that
    /// failed operations persisted nothing.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").users.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store lock poisoned")
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner.users.get(&id.as_i32()).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock();

        // The unique index is the authoritative guard in the real store;
        // mirror it here so conflict paths behave identically.
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.next_id),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            user_type: new_user.user_type,
            is_verified: new_user.is_verified,
            otp: new_user.otp,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id.as_i32(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id.as_i32())
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(is_verified) = patch.is_verified {
            user.is_verified = is_verified;
        }
        match patch.otp {
            Some(OtpPatch::Set(pending)) => user.otp = Some(pending),
            Some(OtpPatch::Clear) => user.otp = None,
            None => {}
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, StoreError> {
        let inner = self.lock();
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.user_type == user_type)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id.as_i32());
        Ok(users)
    }
}
