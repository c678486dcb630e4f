/// Database models
///
/// One module per persisted entity, each pairing a row struct with its
/// operations over `&PgPool`.
///
/// - `user`: accounts and credential lookup
/// - `asset`: tracked infrastructure records
///
/// Projects, tasks, and handoffs are provisioned in the schema (see
/// `migrations/`) but have no model module yet; their route groups answer
/// 501 until the handlers land.

pub mod asset;
pub mod user;
