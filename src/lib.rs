//! SISGEFI - Income/expense tracking backend
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool
//! - [`user_auth`] - Login, session tokens, the route gate, password reset
//! - [`account`] - Accounts and their profile/role/status management
//! - [`catalog`] - Roles and committees
//! - [`entries`] - Income/expense entries
//! - [`voucher`] - Receipt attachments: storage, sniffing, serving
//! - [`notify`] - Outbound email
//! - [`gateway`] - HTTP router, shared state, error envelope

pub mod account;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entries;
pub mod gateway;
pub mod logging;
pub mod notify;
pub mod user_auth;
pub mod voucher;

pub use config::AppConfig;
pub use gateway::error::{ApiError, ApiResult};
pub use gateway::state::AppState;
