use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{RecordId, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(RecordId),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    Inactive,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            UserError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            UserError::Inactive => AppError::Unauthorized("Account is inactive".to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Forbidden(msg) => AppError::Forbidden(msg),
            UserError::PasswordHash(msg) => AppError::InternalServerError(msg),
            UserError::Store(e) => AppError::Store(e),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
