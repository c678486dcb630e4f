/// Database access
///
/// - [`pool`]: PostgreSQL connection pool construction and health checks
/// - [`migrations`]: embedded migration runner
///
/// The pool is the process's single connection to persistent state; it is
/// created once at startup and shared by every handler. Startup fails fast
/// if the database is unreachable.

pub mod migrations;
pub mod pool;
