use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::models::{
    Committee, CommitteeList, CreateCommitteeRequest, CreateRoleRequest, RoleList, RoleRecord,
};
use super::repository::{CommitteeRepository, RoleRepository};
use crate::gateway::error::{ApiError, ApiResult};
use crate::gateway::extract::{ApiPath, ValidatedJson};
use crate::gateway::state::AppState;
use crate::gateway::types::{DataResponse, MessageResponse};

// ============================================================================
// Roles
// ============================================================================

/// GET /api/roles
pub async fn list_roles(State(state): State<Arc<AppState>>) -> ApiResult<Json<RoleList>> {
    let roles = RoleRepository::list(state.pg_db.pool()).await?;
    Ok(Json(RoleList { roles }))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<RoleRecord>>)> {
    let pool = state.pg_db.pool();
    let name = req.name.trim();

    if RoleRepository::name_exists(pool, name).await? {
        return Err(ApiError::Conflict("A role with that name already exists".to_string()));
    }

    let role = RoleRepository::create(pool, name, req.description.as_deref()).await?;
    tracing::info!(role_id = role.id, "Role created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Role created", role)),
    ))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    if !RoleRepository::delete(state.pg_db.pool(), id).await? {
        return Err(ApiError::not_found("Role not found"));
    }
    tracing::info!(role_id = id, "Role deleted");
    Ok(Json(MessageResponse::new("Role deleted")))
}

// ============================================================================
// Committees
// ============================================================================

/// GET /api/committees
pub async fn list_committees(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CommitteeList>> {
    let committees = CommitteeRepository::list(state.pg_db.pool()).await?;
    Ok(Json(CommitteeList { committees }))
}

/// GET /api/committees/{id}
pub async fn get_committee(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<Committee>> {
    CommitteeRepository::get_by_id(state.pg_db.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Committee not found"))
}

/// POST /api/committees
pub async fn create_committee(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCommitteeRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<Committee>>)> {
    let pool = state.pg_db.pool();
    let name = req.name.trim();

    if CommitteeRepository::name_exists(pool, name).await? {
        return Err(ApiError::Conflict(
            "A committee with that name already exists".to_string(),
        ));
    }

    let committee = CommitteeRepository::create(pool, name, req.epoch.trim()).await?;
    tracing::info!(committee_id = committee.id, "Committee created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Committee created", committee)),
    ))
}

/// DELETE /api/committees/{id}
pub async fn delete_committee(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    if !CommitteeRepository::delete(state.pg_db.pool(), id).await? {
        return Err(ApiError::not_found("Committee not found"));
    }
    tracing::info!(committee_id = id, "Committee deleted");
    Ok(Json(MessageResponse::new("Committee deleted")))
}
