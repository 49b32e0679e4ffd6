use axum::{Extension, Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::middleware::AuthContext;
use super::reset::{ForgotPasswordRequest, ResetPasswordRequest};
use super::service::{LoginRequest, LoginResponse};
use crate::gateway::error::ApiResult;
use crate::gateway::extract::ValidatedJson;
use crate::gateway::state::AppState;
use crate::gateway::types::MessageResponse;

/// Login user
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let resp = state.user_auth.login(req).await?;
    Ok(Json(resp))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub role_id: i32,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: VerifiedUser,
}

/// Echo the identity carried by the caller's session token
///
/// GET /api/auth/verify
pub async fn verify(Extension(ctx): Extension<AuthContext>) -> Json<VerifyResponse> {
    let claims = ctx.claims;
    Json(VerifyResponse {
        valid: true,
        user: VerifiedUser {
            id: claims.account_id,
            email: claims.email,
            role: claims.role_name,
            role_id: claims.role_id,
        },
    })
}

/// Start password recovery
///
/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.password_reset.request(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "A password reset link has been sent to your email",
    )))
}

/// Redeem a reset token
///
/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .password_reset
        .redeem(&req.token, req.password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
