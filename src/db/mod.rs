//! Database connection management

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL database connection pool
///
/// Built once by the entry point and shared through `AppState`.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = Self::pool_options().connect(database_url).await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Create a pool that opens connections on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = Self::pool_options().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    fn pool_options() -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip to the server, returning its clock
    pub async fn server_time(&self) -> Result<DateTime<Utc>, sqlx::Error> {
        sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&self.pool)
            .await
    }
}
