//! # CrewCall Shared Library
//!
//! Shared types, database access, and business logic used by the CrewCall
//! API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models, CRUD, and the shift assignment workflow
//! - `auth`: Password hashing, JWT, Axum middleware, and role checks
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the CrewCall shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
