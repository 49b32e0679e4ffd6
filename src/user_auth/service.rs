use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::password::PasswordHasher;
use super::token::SessionTokens;
use crate::account::{AccountStore, AccountView, NewAccount};
use crate::gateway::error::{ApiError, ApiResult};

/// User Login Request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Identity summary returned with a fresh session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_id: i32,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(range(min = 1))]
    pub role_id: i32,
    pub committee_id: Option<i32>,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct UserAuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<SessionTokens>,
    hasher: PasswordHasher,
}

impl UserAuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<SessionTokens>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> &Arc<SessionTokens> {
        &self.tokens
    }

    /// Login user and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// The status check runs after the password check so an inactive account
    /// is only revealed to someone holding its password.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        let Some(account) = self.accounts.find_by_email(&req.email).await? else {
            tracing::info!("Login failed: unknown email");
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify_blocking(req.password, account.password_hash.clone())
            .await?;
        if !matches {
            tracing::info!(account_id = account.id, "Login failed: wrong password");
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS));
        }

        if !account.can_login() {
            tracing::info!(account_id = account.id, "Login refused: account inactive");
            return Err(ApiError::Forbidden(
                "Account inactive. Contact the administrator.",
            ));
        }

        let token = self
            .tokens
            .issue(account.id, &account.email, &account.role_name, account.role_id)
            .map_err(|e| ApiError::internal("Failed to sign session token", e))?;

        tracing::info!(account_id = account.id, "Login succeeded");
        Ok(LoginResponse {
            token,
            user: SessionUser {
                id: account.id,
                name: account.display_name(),
                email: account.email,
                role: account.role_name,
                role_id: account.role_id,
            },
        })
    }

    /// Register a new account (status `active`).
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<AccountView> {
        if self.accounts.find_by_email(&req.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash_blocking(req.password).await?;

        let account = self
            .accounts
            .create(NewAccount {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password_hash,
                role_id: req.role_id,
                committee_id: req.committee_id,
            })
            .await?;

        tracing::info!(account_id = account.id, role_id = account.role_id, "Account registered");
        Ok(AccountView::from(&account))
    }
}
