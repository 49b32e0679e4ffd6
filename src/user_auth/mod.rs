//! Authentication and authorization.
//!
//! - [`password`]: Argon2id hashing
//! - [`token`]: HS256 session tokens
//! - [`roles`]: typed roles and per-route allow-lists
//! - [`middleware`]: the gate in front of protected route groups
//! - [`service`]: login and registration
//! - [`reset`]: password reset tokens

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod reset;
pub mod roles;
pub mod service;
pub mod token;

pub use middleware::{AuthContext, Gate, gate_middleware};
pub use password::PasswordHasher;
pub use reset::{PasswordResetService, PgResetTokenStore, ResetTokenStore};
pub use roles::{Role, RouteAccess};
pub use service::UserAuthService;
pub use token::{Claims, SessionTokens};
