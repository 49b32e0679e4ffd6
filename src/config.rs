use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL (overridden by `DATABASE_URL`)
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
    /// Outbound mail; password reset links are only logged when absent
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for any request body, voucher uploads included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Allowed CORS origin; defaults to `auth.frontend_url`, `"*"` allows any
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret (overridden by `JWT_SECRET`)
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_reset_ttl_minutes")]
    pub reset_ttl_minutes: i64,
    /// Base URL of the web client, used to build reset links (overridden by `FRONTEND_URL`)
    pub frontend_url: String,
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
}

fn default_session_ttl_hours() -> i64 {
    10
}

fn default_reset_ttl_minutes() -> i64 {
    5
}

/// Argon2id cost parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Overridden by `SMTP_USERNAME`
    #[serde(default)]
    pub username: String,
    /// Overridden by `SMTP_PASSWORD`
    #[serde(default)]
    pub password: String,
    /// Sender mailbox, e.g. `"SISGEFI <no-reply@example.com>"`
    pub from: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    /// Secrets are expected from the environment in deployed setups.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = var("FRONTEND_URL") {
            self.auth.frontend_url = url;
        }
        if let Some(smtp) = self.smtp.as_mut() {
            if let Some(user) = var("SMTP_USERNAME") {
                smtp.username = user;
            }
            if let Some(pass) = var("SMTP_PASSWORD") {
                smtp.password = pass;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret is empty (set it in the config or via JWT_SECRET)");
        }
        if self.auth.session_ttl_hours <= 0 || self.auth.reset_ttl_minutes <= 0 {
            bail!("auth token lifetimes must be positive");
        }
        Ok(())
    }
}
