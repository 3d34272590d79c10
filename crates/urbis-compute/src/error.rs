//! Compute engine error types.

use thiserror::Error;

/// Errors raised while talking to a geometry compute engine.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine returned a non-success status code.
    #[error("compute API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the engine.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The engine answered with a body that is not a compute response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The engine did not answer within the configured timeout.
    #[error("compute timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The compute section of the configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] urbis_config::ConfigError),

    /// The definition file could not be read.
    #[error("cannot read definition {path}: {source}")]
    Definition {
        path: String,
        source: std::io::Error,
    },

    /// No geometry artifact could be found in the response.
    #[error("extraction error: {0}")]
    Extraction(String),
}

impl ComputeError {
    /// Extraction failures are reported separately from engine failures.
    #[must_use]
    pub const fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }
}
