//! Shared harness: the real router over in-memory stores.
//!
//! Routes that go through `AccountStore`, `ResetTokenStore` and `VoucherStore`
//! are fully exercised. The PostgreSQL pool is lazy and never reached unless a
//! test hits a repository-backed route past the gate.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use sisgefi::account::{Account, AccountStatus, AccountStore, NewAccount};
use sisgefi::config::{AppConfig, PasswordHashConfig};
use sisgefi::db::Database;
use sisgefi::gateway::build_router;
use sisgefi::gateway::state::{AppState, Stores};
use sisgefi::notify::{Email, Notifier};
use sisgefi::user_auth::reset::{ResetError, ResetToken};
use sisgefi::user_auth::{PasswordHasher, ResetTokenStore, SessionTokens};
use sisgefi::voucher::{VoucherLookup, VoucherStore};

pub const ADMIN_ROLE: i32 = 1;
pub const TREASURER_ROLE: i32 = 64;
pub const MEMBER_ROLE: i32 = 5;

pub const TEST_CONFIG: &str = r#"
log_level: info
log_dir: ./logs
log_file: test.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
  max_body_bytes: 65536
auth:
  jwt_secret: integration-test-secret
  frontend_url: http://localhost:5173/
  password_hash:
    memory_kib: 8
    iterations: 1
    parallelism: 1
"#;

fn role_name(role_id: i32) -> String {
    match role_id {
        ADMIN_ROLE => "admin".to_string(),
        TREASURER_ROLE => "treasurer".to_string(),
        _ => "member".to_string(),
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn get(&self, id: i64) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub fn set_password_hash(&self, id: i64, hash: &str) -> bool {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.password_hash = hash.to_string();
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn update<F: FnOnce(&mut Account)>(&self, id: i64, f: F) -> Option<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.iter_mut().find(|a| a.id == id)?;
        f(account);
        account.updated_at = Utc::now();
        Some(account.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        Ok(self.get(id))
    }

    async fn list(&self) -> Result<Vec<Account>, sqlx::Error> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn create(&self, new: NewAccount) -> Result<Account, sqlx::Error> {
        let mut accounts = self.accounts.lock().unwrap();
        let now = Utc::now();
        let account = Account {
            id: accounts.len() as i64 + 1,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            role_id: new.role_id,
            role_name: role_name(new.role_id),
            status: AccountStatus::Active,
            committee_id: new.committee_id,
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn update_profile(
        &self,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<Account>, sqlx::Error> {
        Ok(self.update(id, |a| {
            if let Some(first) = first_name {
                a.first_name = first.to_string();
            }
            if let Some(last) = last_name {
                a.last_name = last.to_string();
            }
        }))
    }

    async fn set_role(&self, id: i64, role_id: i32) -> Result<Option<Account>, sqlx::Error> {
        Ok(self.update(id, |a| {
            a.role_id = role_id;
            a.role_name = role_name(role_id);
        }))
    }

    async fn set_status(
        &self,
        id: i64,
        status: AccountStatus,
    ) -> Result<Option<Account>, sqlx::Error> {
        Ok(self.update(id, |a| a.status = status))
    }
}

// ============================================================================
// Reset tokens
// ============================================================================

pub struct MemoryResetStore {
    accounts: Arc<MemoryAccountStore>,
    tokens: Mutex<Vec<ResetToken>>,
}

impl MemoryResetStore {
    pub fn new(accounts: Arc<MemoryAccountStore>) -> Self {
        Self {
            accounts,
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn all(&self) -> Vec<ResetToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResetTokenStore for MemoryResetStore {
    async fn insert(
        &self,
        account_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetToken, sqlx::Error> {
        let mut tokens = self.tokens.lock().unwrap();
        let reset = ResetToken {
            id: tokens.len() as i64 + 1,
            account_id,
            token: token.to_string(),
            expires_at,
            used: false,
        };
        tokens.push(reset.clone());
        Ok(reset)
    }

    async fn find(&self, token: &str) -> Result<Option<ResetToken>, sqlx::Error> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn redeem(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<i64, ResetError> {
        // the whole check-and-write runs under one lock
        let mut tokens = self.tokens.lock().unwrap();
        let reset = tokens
            .iter_mut()
            .find(|t| t.token == token)
            .ok_or(ResetError::UnknownToken)?;
        reset.check(now)?;

        if !self.accounts.set_password_hash(reset.account_id, password_hash) {
            return Err(ResetError::Database(sqlx::Error::RowNotFound));
        }
        reset.used = true;
        Ok(reset.account_id)
    }
}

// ============================================================================
// Vouchers
// ============================================================================

#[derive(Default)]
pub struct MemoryVoucherStore {
    // entry id -> (owner account id, voucher)
    entries: Mutex<HashMap<i64, (i64, Option<Vec<u8>>)>>,
}

impl MemoryVoucherStore {
    pub fn add_entry(&self, entry_id: i64, owner: i64, voucher: Option<Vec<u8>>) {
        self.entries.lock().unwrap().insert(entry_id, (owner, voucher));
    }
}

#[async_trait]
impl VoucherStore for MemoryVoucherStore {
    async fn load(&self, entry_id: i64) -> Result<VoucherLookup, sqlx::Error> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(&entry_id).map(|(_, v)| v.clone()).into())
    }

    async fn owner(&self, entry_id: i64) -> Result<Option<i64>, sqlx::Error> {
        Ok(self.entries.lock().unwrap().get(&entry_id).map(|(o, _)| *o))
    }

    async fn replace(&self, entry_id: i64, bytes: &[u8]) -> Result<bool, sqlx::Error> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&entry_id) {
            Some((_, slot)) => {
                *slot = Some(bytes.to_vec());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Email>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_sends(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("SMTP relay unreachable");
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

// ============================================================================
// App
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub accounts: Arc<MemoryAccountStore>,
    pub resets: Arc<MemoryResetStore>,
    pub vouchers: Arc<MemoryVoucherStore>,
    pub notifier: Arc<RecordingNotifier>,
    hasher: PasswordHasher,
}

impl TestApp {
    /// Must be called inside a tokio runtime (the lazy pool spawns its reaper).
    pub fn new() -> Self {
        let config = AppConfig::from_yaml(TEST_CONFIG).unwrap();
        let pg_db = Arc::new(Database::connect_lazy("postgresql://nobody@127.0.0.1:1/none").unwrap());

        let accounts = Arc::new(MemoryAccountStore::default());
        let resets = Arc::new(MemoryResetStore::new(accounts.clone()));
        let vouchers = Arc::new(MemoryVoucherStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let state = Arc::new(
            AppState::assemble(
                &config,
                pg_db,
                Stores {
                    accounts: accounts.clone(),
                    resets: resets.clone(),
                    vouchers: vouchers.clone(),
                    notifier: notifier.clone(),
                },
            )
            .unwrap(),
        );
        let router = build_router(&config, state.clone()).unwrap();

        Self {
            router,
            state,
            accounts,
            resets,
            vouchers,
            notifier,
            hasher: PasswordHasher::new(&PasswordHashConfig {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        }
    }

    pub fn tokens(&self) -> &SessionTokens {
        self.state.tokens()
    }

    /// Insert an account directly, bypassing the admin-only registration route.
    pub async fn seed_account(&self, email: &str, password: &str, role_id: i32) -> Account {
        let password_hash = self.hasher.hash(password).unwrap();
        self.accounts
            .create(NewAccount {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password_hash,
                role_id,
                committee_id: None,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, account: &Account) -> String {
        self.tokens()
            .issue(
                account.id,
                &account.email,
                &account.role_name,
                account.role_id,
            )
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
