/// API route handlers
///
/// - `health`: liveness string and database health probe
/// - `auth`: registration, login, and the caller's own record
/// - `assets`: asset CRUD
/// - `stubs`: declared resources whose handlers are not implemented

pub mod assets;
pub mod auth;
pub mod health;
pub mod stubs;
