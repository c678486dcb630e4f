/// Declared resources without handlers
///
/// The project, task, and handoff route groups are part of the API surface
/// and sit behind the token gate, but their CRUD behavior is not defined
/// yet. They answer an explicit 501 rather than a silent 404 so the
/// contract is visible to clients.

use crate::error::ApiError;

/// `ANY /api/projects[/*]`
pub async fn projects() -> ApiError {
    ApiError::NotImplemented("Project endpoints are not implemented".to_string())
}

/// `ANY /api/tasks[/*]`
pub async fn tasks() -> ApiError {
    ApiError::NotImplemented("Task endpoints are not implemented".to_string())
}

/// `ANY /api/handoffs[/*]`
pub async fn handoffs() -> ApiError {
    ApiError::NotImplemented("Handoff endpoints are not implemented".to_string())
}
