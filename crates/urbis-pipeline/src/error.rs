//! Pipeline error types.

use thiserror::Error;
use urbis_compute::ComputeError;
use urbis_core::errors::CoreError;

/// Errors returned by [`GeometryPipeline`](crate::GeometryPipeline).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request or the stored footprint is invalid. Carries every problem found.
    #[error("validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// The engine failed, answered badly, or timed out.
    #[error("compute failed: {0}")]
    Compute(#[source] ComputeError),

    /// The engine answered but no artifact could be found in the response.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The stored hierarchy is broken around the building.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The storage backend failed.
    #[error("store error: {0}")]
    Store(String),
}

impl PipelineError {
    /// The entity is still valid and persisted; only its geometry is missing.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Compute(_) | Self::Extraction(_))
    }

    /// Process exit code used by the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::Compute(_) | Self::Extraction(_) => 4,
            Self::Integrity(_) => 5,
            Self::Store(_) => 1,
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            CoreError::Validation(msg) => Self::Validation { errors: vec![msg] },
            CoreError::Integrity(msg) => Self::Integrity(msg),
            err @ CoreError::InvalidTransition { .. } => Self::Integrity(err.to_string()),
            CoreError::Storage(msg) => Self::Store(msg),
            CoreError::Other(err) => Self::Store(err.to_string()),
        }
    }
}

impl From<ComputeError> for PipelineError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::Extraction(msg) => Self::Extraction(msg),
            other => Self::Compute(other),
        }
    }
}
