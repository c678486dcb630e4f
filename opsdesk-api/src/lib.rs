//! # opsdesk API server library
//!
//! Core functionality for the opsdesk API server.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `extract`: request extractors with unified error responses
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
