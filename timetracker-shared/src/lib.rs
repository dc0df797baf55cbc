//! # Timetracker Shared Library
//!
//! Domain types, storage and business rules behind the Timetracker API.
//!
//! ## Module Organization
//!
//! - `models`: database rows and their queries
//! - `repository`: storage traits plus PostgreSQL and Redis implementations
//! - `usecase`: business rules on top of the repositories
//! - `auth`: password hashing and access-control rules
//! - `db`: connection pool and migrations
//! - `redis`: Redis connection wrapper
//! - `timespan`: duration formatting and day boundaries
//! - `error`: shared error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod redis;
pub mod repository;
pub mod timespan;
pub mod usecase;

/// Current version of the Timetracker shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
