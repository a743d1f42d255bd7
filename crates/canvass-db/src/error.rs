//! Database-specific error types and conversions.

use canvass_core::error::CanvassError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for CanvassError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CanvassError::NotFound { entity, id },
            other => CanvassError::Database(other.to_string()),
        }
    }
}
