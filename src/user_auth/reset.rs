//! Password reset tokens.
//!
//! A token is 32 random bytes in hex, bound to one account, valid for a short
//! window and redeemable once. Redeeming sets the new password hash and marks
//! the token used in a single transaction with the token row locked.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use sqlx::Row;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use super::password::PasswordHasher;
use crate::account::AccountStore;
use crate::db::Database;
use crate::gateway::error::{ApiError, ApiResult};
use crate::notify::{Email, Notifier};

const TOKEN_BYTES: usize = 32;

/// Stored reset token
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub id: i64,
    pub account_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl ResetToken {
    /// Redeemable iff unused and `now < expires_at`.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), ResetError> {
        if self.used || now >= self.expires_at {
            return Err(ResetError::ExpiredOrUsed);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("reset token not found")]
    UnknownToken,
    #[error("reset token expired or already used")]
    ExpiredOrUsed,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::UnknownToken => ApiError::InvalidResetToken,
            ResetError::ExpiredOrUsed => ApiError::ExpiredOrUsed,
            ResetError::Database(e) => e.into(),
        }
    }
}

/// 64 lowercase hex chars from the OS RNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert(
        &self,
        account_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetToken, sqlx::Error>;

    async fn find(&self, token: &str) -> Result<Option<ResetToken>, sqlx::Error>;

    /// Check the token at `now` (or later, if the wall clock has moved past
    /// it), store `password_hash` on its account and mark it used,
    /// atomically. Returns the account id.
    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<i64, ResetError>;
}

/// PostgreSQL-backed reset token store.
pub struct PgResetTokenStore {
    db: Arc<Database>,
}

impl PgResetTokenStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_token(row: &sqlx::postgres::PgRow) -> Result<ResetToken, sqlx::Error> {
        Ok(ResetToken {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            token: row.try_get("token")?,
            expires_at: row.try_get("expires_at")?,
            used: row.try_get("used")?,
        })
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn insert(
        &self,
        account_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetToken, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO password_resets (account_id, token, expires_at, used)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, account_id, token, expires_at, used
            "#,
        )
        .bind(account_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(self.db.pool())
        .await?;

        Self::row_to_token(&row)
    }

    async fn find(&self, token: &str) -> Result<Option<ResetToken>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, account_id, token, expires_at, used FROM password_resets WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<i64, ResetError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, account_id, token, expires_at, used
            FROM password_resets
            WHERE token = $1
            FOR UPDATE
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let reset = match row {
            Some(row) => Self::row_to_token(&row)?,
            None => return Err(ResetError::UnknownToken),
        };
        // `now` predates hashing and the lock wait; dropping `tx` on the
        // error path rolls back and releases the lock
        reset.check(now.max(Utc::now()))?;

        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(reset.account_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reset.account_id)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Issues reset links and redeems them.
pub struct PasswordResetService {
    accounts: Arc<dyn AccountStore>,
    resets: Arc<dyn ResetTokenStore>,
    notifier: Arc<dyn Notifier>,
    hasher: PasswordHasher,
    frontend_url: String,
    ttl: Duration,
}

impl PasswordResetService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        resets: Arc<dyn ResetTokenStore>,
        notifier: Arc<dyn Notifier>,
        hasher: PasswordHasher,
        frontend_url: String,
        ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            resets,
            notifier,
            hasher,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    /// Store a fresh token for the account behind `email` and mail the link.
    ///
    /// Earlier outstanding tokens stay valid. A failed send is logged and
    /// does not fail the request.
    pub async fn request(&self, email: &str) -> ApiResult<()> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let token = generate_token();
        let expires_at = Utc::now() + self.ttl;
        self.resets.insert(account.id, &token, expires_at).await?;

        let message = Email {
            to: account.email.clone(),
            subject: "Password recovery".to_string(),
            html_body: format!(
                "<p>Hello {},</p>\
                 <p>Use the link below to choose a new password. It expires in {} minutes.</p>\
                 <p><a href=\"{link}\">{link}</a></p>",
                account.first_name,
                self.ttl.num_minutes(),
                link = self.reset_link(&token),
            ),
        };

        if let Err(e) = self.notifier.send(message).await {
            tracing::error!(account_id = account.id, "Failed to send reset email: {:#}", e);
        } else {
            tracing::info!(account_id = account.id, "Password reset link issued");
        }
        Ok(())
    }

    pub async fn redeem(&self, token: &str, new_password: String) -> ApiResult<()> {
        self.redeem_at(token, new_password, Utc::now()).await
    }

    /// Redeem as if the current time were `now`.
    pub async fn redeem_at(
        &self,
        token: &str,
        new_password: String,
        now: DateTime<Utc>,
    ) -> ApiResult<()> {
        // reject early without paying for a hash; `redeem` re-checks under lock
        let reset = self
            .resets
            .find(token)
            .await?
            .ok_or(ApiError::InvalidResetToken)?;
        reset.check(now)?;

        let password_hash = self.hasher.hash_blocking(new_password).await?;
        let account_id = self.resets.redeem(token, now, &password_hash).await?;

        tracing::info!(account_id, "Password reset completed");
        Ok(())
    }
}
