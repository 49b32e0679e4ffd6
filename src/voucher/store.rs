use async_trait::async_trait;
use std::sync::Arc;

use crate::db::Database;

/// Result of looking up the voucher attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherLookup {
    /// No entry with that id
    MissingEntry,
    /// Entry exists without a voucher (NULL or zero bytes)
    Empty,
    Present(Vec<u8>),
}

impl From<Option<Option<Vec<u8>>>> for VoucherLookup {
    fn from(row: Option<Option<Vec<u8>>>) -> Self {
        match row {
            None => VoucherLookup::MissingEntry,
            Some(None) => VoucherLookup::Empty,
            Some(Some(bytes)) if bytes.is_empty() => VoucherLookup::Empty,
            Some(Some(bytes)) => VoucherLookup::Present(bytes),
        }
    }
}

#[async_trait]
pub trait VoucherStore: Send + Sync {
    async fn load(&self, entry_id: i64) -> Result<VoucherLookup, sqlx::Error>;

    /// Account that owns the entry; `None` when the entry does not exist.
    async fn owner(&self, entry_id: i64) -> Result<Option<i64>, sqlx::Error>;

    /// Overwrite the blob; `false` when the entry does not exist.
    async fn replace(&self, entry_id: i64, bytes: &[u8]) -> Result<bool, sqlx::Error>;
}

pub struct PgVoucherStore {
    db: Arc<Database>,
}

impl PgVoucherStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoucherStore for PgVoucherStore {
    async fn load(&self, entry_id: i64) -> Result<VoucherLookup, sqlx::Error> {
        let row: Option<Option<Vec<u8>>> =
            sqlx::query_scalar("SELECT voucher FROM entries WHERE id = $1")
                .bind(entry_id)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.into())
    }

    async fn owner(&self, entry_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT account_id FROM entries WHERE id = $1")
            .bind(entry_id)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn replace(&self, entry_id: i64, bytes: &[u8]) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("UPDATE entries SET voucher = $2 WHERE id = $1")
            .bind(entry_id)
            .bind(bytes)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
