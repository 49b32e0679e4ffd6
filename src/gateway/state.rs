use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;

use crate::account::{AccountStore, PgAccountStore};
use crate::config::AppConfig;
use crate::db::Database;
use crate::notify::{LogNotifier, Notifier, SmtpNotifier};
use crate::user_auth::{
    PasswordHasher, PasswordResetService, PgResetTokenStore, ResetTokenStore, SessionTokens,
    UserAuthService,
};
use crate::voucher::{PgVoucherStore, VoucherStore};

/// Gateway application state (shared)
///
/// Built once at startup. Stores are trait objects so the router can be
/// exercised against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool, used directly by the CRUD repositories
    pub pg_db: Arc<Database>,
    pub accounts: Arc<dyn AccountStore>,
    pub vouchers: Arc<dyn VoucherStore>,
    pub user_auth: Arc<UserAuthService>,
    pub password_reset: Arc<PasswordResetService>,
}

/// Everything `AppState::assemble` needs besides the config.
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub resets: Arc<dyn ResetTokenStore>,
    pub vouchers: Arc<dyn VoucherStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Production wiring: PostgreSQL-backed stores and SMTP (or log-only) mail.
    pub fn from_config(config: &AppConfig, pg_db: Arc<Database>) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
            None => {
                tracing::warn!("SMTP not configured, password reset emails will not be sent");
                Arc::new(LogNotifier)
            }
        };

        let stores = Stores {
            accounts: Arc::new(PgAccountStore::new(pg_db.clone())),
            resets: Arc::new(PgResetTokenStore::new(pg_db.clone())),
            vouchers: Arc::new(PgVoucherStore::new(pg_db.clone())),
            notifier,
        };
        Self::assemble(config, pg_db, stores)
    }

    pub fn assemble(config: &AppConfig, pg_db: Arc<Database>, stores: Stores) -> Result<Self> {
        let hasher = PasswordHasher::new(&config.auth.password_hash)
            .context("Invalid auth.password_hash settings")?;
        let tokens = Arc::new(SessionTokens::new(
            &config.auth.jwt_secret,
            Duration::hours(config.auth.session_ttl_hours),
        ));

        let user_auth = Arc::new(UserAuthService::new(
            stores.accounts.clone(),
            tokens,
            hasher.clone(),
        ));
        let password_reset = Arc::new(PasswordResetService::new(
            stores.accounts.clone(),
            stores.resets,
            stores.notifier,
            hasher,
            config.auth.frontend_url.clone(),
            Duration::minutes(config.auth.reset_ttl_minutes),
        ));

        Ok(Self {
            pg_db,
            accounts: stores.accounts,
            vouchers: stores.vouchers,
            user_auth,
            password_reset,
        })
    }

    pub fn tokens(&self) -> &Arc<SessionTokens> {
        self.user_auth.tokens()
    }
}
