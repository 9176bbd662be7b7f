use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{RecordId, StoreError};
use thiserror::Error;

use crate::models::MAX_LEVEL;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(RecordId),

    #[error("Owner not found: {0}")]
    UserNotFound(RecordId),

    #[error("Parent task not found: {0}")]
    ParentNotFound(RecordId),

    #[error("Task with title '{0}' already exists for this user")]
    DuplicateTitle(String),

    #[error("Maximum nesting depth of {MAX_LEVEL} levels exceeded")]
    MaxDepthExceeded,

    #[error("Task cannot become its own ancestor")]
    CycleDetected,

    #[error("Task {0} still has subtasks")]
    SubtasksExist(RecordId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(detail) => TaskError::Constraint(detail),
            StoreError::NotFound => TaskError::Internal("record vanished mid-flight".to_string()),
            StoreError::Backend(detail) => TaskError::Internal(detail),
        }
    }
}

/// Convert TaskError to AppError for standardized error responses.
///
/// Integrity violations (duplicate title, depth ceiling, cycles, dangling
/// references, occupied parents) all surface as 400.
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(format!("Task {} not found", id)),
            TaskError::UserNotFound(_)
            | TaskError::ParentNotFound(_)
            | TaskError::MaxDepthExceeded
            | TaskError::CycleDetected
            | TaskError::SubtasksExist(_)
            | TaskError::Validation(_) => AppError::BadRequest(err.to_string()),
            TaskError::DuplicateTitle(_) | TaskError::Constraint(_) => {
                AppError::Conflict(err.to_string())
            }
            TaskError::Forbidden(msg) => AppError::Forbidden(msg),
            TaskError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
