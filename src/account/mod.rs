//! Account management module
//!
//! Accounts carry the credentials checked at login, the role the gate
//! authorizes against, and the active/inactive flag that gates login.

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{Account, AccountStatus, AccountView, NewAccount};
pub use repository::{AccountStore, PgAccountStore};
