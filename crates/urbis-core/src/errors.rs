//! Cross-cutting error types for Urbis.
//!
//! This module defines errors that can originate from any crate in the system.
//! Domain-specific errors (e.g., `DatabaseError`, `ComputeError`) are defined in
//! their respective crates and convert into `CoreError` at the store boundary.

use thiserror::Error;

/// Errors that can be raised by any Urbis crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// The hierarchy invariant is broken (missing parent, kind mismatch, cycle).
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a `NotFound` error on an entity id.
    #[must_use]
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
