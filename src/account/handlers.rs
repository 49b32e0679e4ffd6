use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::models::{AccountStatus, AccountView};
use crate::gateway::error::{ApiError, ApiResult};
use crate::gateway::extract::{ApiPath, ValidatedJson};
use crate::gateway::state::AppState;
use crate::gateway::types::DataResponse;
use crate::user_auth::AuthContext;
use crate::user_auth::service::RegisterRequest;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    #[validate(range(min = 1))]
    pub role_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetStatusRequest {
    pub status: AccountStatus,
}

fn account_not_found() -> ApiError {
    ApiError::not_found("User not found")
}

/// Register a new account
///
/// POST /api/users
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<DataResponse<AccountView>>)> {
    let account = state.user_auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("User registered", account)),
    ))
}

/// GET /api/users
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AccountView>>> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.iter().map(AccountView::from).collect()))
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<AccountView>> {
    let account = state
        .accounts
        .find_by_id(ctx.account_id())
        .await?
        .ok_or_else(account_not_found)?;
    Ok(Json(AccountView::from(&account)))
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<DataResponse<AccountView>>> {
    let account = state
        .accounts
        .update_profile(
            ctx.account_id(),
            req.first_name.as_deref(),
            req.last_name.as_deref(),
        )
        .await?
        .ok_or_else(account_not_found)?;
    Ok(Json(DataResponse::new(
        "Profile updated",
        AccountView::from(&account),
    )))
}

/// PATCH /api/users/{id}/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<SetRoleRequest>,
) -> ApiResult<Json<DataResponse<AccountView>>> {
    let account = state
        .accounts
        .set_role(id, req.role_id)
        .await?
        .ok_or_else(account_not_found)?;

    tracing::info!(account_id = id, role_id = req.role_id, "Role changed");
    Ok(Json(DataResponse::new(
        "Role updated",
        AccountView::from(&account),
    )))
}

/// PATCH /api/users/{id}/status
///
/// An administrator cannot deactivate their own account.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<SetStatusRequest>,
) -> ApiResult<Json<DataResponse<AccountView>>> {
    if id == ctx.account_id() && req.status == AccountStatus::Inactive {
        return Err(ApiError::validation("You cannot deactivate your own account"));
    }

    let account = state
        .accounts
        .set_status(id, req.status)
        .await?
        .ok_or_else(account_not_found)?;

    tracing::info!(account_id = id, status = req.status.as_str(), "Status changed");
    Ok(Json(DataResponse::new(
        "Status updated",
        AccountView::from(&account),
    )))
}
