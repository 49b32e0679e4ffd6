//! Income and expense entries.

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{Entry, EntryKind};
pub use repository::EntryRepository;
