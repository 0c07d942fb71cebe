//! Taskgate Database Layer
//!
//! This crate provides the persistence layer for Taskgate: users, roles,
//! tasks and per-user preferences, stored in SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use store::Store;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
