// ==========================================
// Duty Roster - API layer error types
// ==========================================
// Responsibility: translate repository/engine failures into
// user-facing categories; every message carries an explicit reason
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id={}", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error>> for ApiError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;
