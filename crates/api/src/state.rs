//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::PgUserStore;
use crate::services::AccountService;
use crate::services::mail::SmtpMailer;
use crate::services::token::TokenCodec;

/// The concrete account service used by the running server.
pub type Accounts = AccountService<PgUserStore, SmtpMailer>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the account service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    accounts: Accounts,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let store = PgUserStore::new(pool.clone());
        let mailer = SmtpMailer::new(&config.email)?;
        let tokens = TokenCodec::new(&config.token_secret);
        let accounts = AccountService::new(store, mailer, tokens, config.admin_secret.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                accounts,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the account service.
    #[must_use]
    pub fn accounts(&self) -> &Accounts {
        &self.inner.accounts
    }
}
