//! Gateway-level handlers not owned by a domain module.

pub mod health;

pub use health::health_check;
