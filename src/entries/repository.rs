//! Repository layer for entries

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{Entry, EntryKind, NewEntry, UpdateEntryRequest};

const SELECT_ENTRY: &str = r#"
    SELECT id, account_id, date, kind, activity, code, amount,
           (voucher IS NOT NULL AND octet_length(voucher) > 0) AS has_voucher
    FROM entries
"#;

/// Entry repository for CRUD operations
pub struct EntryRepository;

impl EntryRepository {
    fn row_to_entry(row: &PgRow) -> Result<Entry, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = EntryKind::parse(&kind).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "kind".to_string(),
            source: format!("unknown entry kind '{}'", kind).into(),
        })?;

        Ok(Entry {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            date: row.try_get("date")?,
            kind,
            activity: row.try_get("activity")?,
            code: row.try_get("code")?,
            amount: row.try_get("amount")?,
            has_voucher: row.try_get("has_voucher")?,
        })
    }

    /// All entries, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Entry>, sqlx::Error> {
        let sql = format!("{} ORDER BY date DESC, id DESC", SELECT_ENTRY);
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.iter().map(Self::row_to_entry).collect()
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<Entry>, sqlx::Error> {
        let sql = format!("{} WHERE id = $1", SELECT_ENTRY);
        let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
        row.as_ref().map(Self::row_to_entry).transpose()
    }

    pub async fn create(pool: &PgPool, entry: &NewEntry) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO entries (account_id, date, kind, activity, code, amount, voucher)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(entry.account_id)
        .bind(entry.date)
        .bind(entry.kind.as_str())
        .bind(&entry.activity)
        .bind(&entry.code)
        .bind(entry.amount)
        .bind(&entry.voucher)
        .fetch_one(pool)
        .await
    }

    /// Returns `false` when no entry has that id.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        patch: &UpdateEntryRequest,
    ) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            r#"
            UPDATE entries SET
                date     = COALESCE($2, date),
                kind     = COALESCE($3, kind),
                activity = COALESCE($4, activity),
                code     = COALESCE($5, code),
                amount   = COALESCE($6, amount)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.date)
        .bind(patch.kind.map(EntryKind::as_str))
        .bind(&patch.activity)
        .bind(&patch.code)
        .bind(patch.amount.map(|a| a.inner()))
        .execute(pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
