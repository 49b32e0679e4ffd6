//! Repository layer for roles and committees

use sqlx::PgPool;

use super::models::{Committee, RoleRecord};

/// Role repository
pub struct RoleRepository;

impl RoleRepository {
    /// All roles ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<RoleRecord>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, description FROM roles ORDER BY name")
            .fetch_all(pool)
            .await
    }

    pub async fn name_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await
    }

    /// Returns `false` when no role has that id.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Committee repository
pub struct CommitteeRepository;

impl CommitteeRepository {
    /// All committees ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Committee>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, epoch FROM committees ORDER BY name")
            .fetch_all(pool)
            .await
    }

    pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<Committee>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, epoch FROM committees WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn name_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM committees WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str, epoch: &str) -> Result<Committee, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO committees (name, epoch) VALUES ($1, $2) RETURNING id, name, epoch",
        )
        .bind(name)
        .bind(epoch)
        .fetch_one(pool)
        .await
    }

    /// Returns `false` when no committee has that id.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM committees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
