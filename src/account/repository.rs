//! Credential store: account persistence behind a trait so the auth services
//! can run against PostgreSQL in production and in-memory fakes in tests.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::sync::Arc;

use super::models::{Account, AccountStatus, NewAccount};
use crate::db::Database;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error>;

    async fn list(&self) -> Result<Vec<Account>, sqlx::Error>;

    async fn create(&self, account: NewAccount) -> Result<Account, sqlx::Error>;

    /// `None` fields are left unchanged. Returns `None` if the account is gone.
    async fn update_profile(
        &self,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<Account>, sqlx::Error>;

    async fn set_role(&self, id: i64, role_id: i32) -> Result<Option<Account>, sqlx::Error>;

    async fn set_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<Account>, sqlx::Error>;
}

const SELECT_ACCOUNT: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.email, u.password_hash,
           u.role_id, r.name AS role_name, u.status, u.committee_id,
           u.created_at, u.updated_at
    FROM accounts u
    JOIN roles r ON r.id = u.role_id
"#;

/// PostgreSQL-backed account store.
pub struct PgAccountStore {
    db: Arc<Database>,
}

impl PgAccountStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Account {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role_id: row.try_get("role_id")?,
            role_name: row.try_get("role_name")?,
            status: AccountStatus::from(status.as_str()),
            committee_id: row.try_get("committee_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!("{} WHERE u.email = $1", SELECT_ACCOUNT);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!("{} WHERE u.id = $1", SELECT_ACCOUNT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, sqlx::Error> {
        let sql = format!("{} ORDER BY u.last_name, u.first_name", SELECT_ACCOUNT);
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::row_to_account).collect()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (first_name, last_name, email, password_hash, role_id, committee_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'active')
            RETURNING id
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role_id)
        .bind(account.committee_id)
        .fetch_one(self.db.pool())
        .await?;

        self.find_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_profile(
        &self,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<Account>, sqlx::Error> {
        let res = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .execute(self.db.pool())
        .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn set_role(&self, id: i64, role_id: i32) -> Result<Option<Account>, sqlx::Error> {
        let res = sqlx::query("UPDATE accounts SET role_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role_id)
            .execute(self.db.pool())
            .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn set_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<Account>, sqlx::Error> {
        let res = sqlx::query("UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.db.pool())
            .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
