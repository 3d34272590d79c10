//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to merge or the merged value did not fit `UrbisConfig`.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// The compute section lacks a base URL or a definition.
    #[error("Configuration section '{section}' is not configured (missing required fields)")]
    NotConfigured { section: String },

    /// A field parsed but its value is unusable (e.g. a zero timeout).
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// A `.env` file exists but could not be read or parsed.
    #[error("Failed to load dotenv file at {}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}
