use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::roles::{Role, RouteAccess};
use super::token::{Claims, SessionTokens};
use crate::gateway::error::ApiError;

/// Identity of the caller, created once per request by the gate and handed to
/// handlers as `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn account_id(&self) -> i64 {
        self.claims.account_id
    }

    pub fn role(&self) -> Role {
        self.claims.role()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Administrator
    }

    /// Administrators act on any account's records, everyone else on their own.
    pub fn may_act_for(&self, account_id: i64) -> bool {
        self.is_admin() || self.account_id() == account_id
    }
}

/// Gate configuration for one route group.
#[derive(Clone)]
pub struct Gate {
    tokens: Arc<SessionTokens>,
    access: RouteAccess,
}

impl Gate {
    pub fn new(tokens: Arc<SessionTokens>, access: RouteAccess) -> Self {
        Self { tokens, access }
    }
}

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthenticated("Missing Authorization header"))?;

    // scheme is case-insensitive
    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthenticated("Invalid Authorization header format")),
    }
}

/// Authentication then authorization, as one step.
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &SessionTokens,
    access: RouteAccess,
) -> Result<AuthContext, ApiError> {
    let token = bearer_token(headers)?;

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!("Session token rejected: {}", e);
        ApiError::InvalidToken
    })?;

    if !access.permits(claims.role()) {
        tracing::warn!(
            account_id = claims.account_id,
            role_id = claims.role_id,
            "Role not allowed for route"
        );
        return Err(ApiError::Forbidden(
            "You do not have permission to access this resource",
        ));
    }

    Ok(AuthContext { claims })
}

pub async fn gate_middleware(
    State(gate): State<Gate>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authenticate(request.headers(), &gate.tokens, gate.access)?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
