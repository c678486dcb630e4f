//! # opsdesk shared library
//!
//! Shared types and utilities used by the opsdesk API server.
//!
//! ## Module organization
//!
//! - `auth`: password hashing, token issue/verify, auth middleware
//! - `db`: connection pool and migration runner
//! - `models`: database models and their operations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the opsdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
