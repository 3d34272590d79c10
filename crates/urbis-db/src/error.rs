//! Database error types for urbis-db.

use thiserror::Error;
use urbis_core::errors::CoreError;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or a column could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A stored JSON column did not match the entity model.
    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// JSON encoding of an entity column failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DatabaseError> for CoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Corrupt { .. } => Self::Integrity(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}
