//! Reference data: roles and committees.

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{Committee, RoleRecord};
pub use repository::{CommitteeRepository, RoleRepository};
