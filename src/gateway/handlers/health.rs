//! Health check handler

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::gateway::error::{ApiError, ApiResult};
use crate::gateway::state::AppState;

/// Health check response data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub message: &'static str,
    /// Database server clock
    pub db_time: DateTime<Utc>,
    /// Git hash the binary was built from
    pub build: &'static str,
}

/// Health check endpoint
///
/// Round-trips to PostgreSQL on every call. A failed ping is logged and
/// answered with the generic 500 envelope.
///
/// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let db_time = state
        .pg_db
        .server_time()
        .await
        .map_err(|e| ApiError::internal("[HEALTH] PostgreSQL ping failed", e))?;

    Ok(Json(HealthResponse {
        message: "API running",
        db_time,
        build: env!("GIT_HASH"),
    }))
}
