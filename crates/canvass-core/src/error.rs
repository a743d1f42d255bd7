//! Error types for the canvass access service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvassError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },
}

impl CanvassError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CanvassError::NotFound { .. })
    }
}

pub type CanvassResult<T> = Result<T, CanvassError>;
