//! Geometry compute engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default compute server base URL.
fn default_base_url() -> String {
    "http://localhost:5000/".to_string()
}

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComputeConfig {
    /// Base URL of the compute server (e.g., `http://localhost:5000/`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Grasshopper definition: a local file path, sent inline, or an
    /// `http(s)://` URL, sent as a pointer.
    #[serde(default)]
    pub definition: String,

    /// Optional key sent as the `RhinoComputeKey` header.
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip the engine entirely and return empty artifacts.
    #[serde(default)]
    pub offline: bool,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            definition: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            offline: false,
        }
    }
}

impl ComputeConfig {
    /// Check if a base URL and a definition are both set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.definition.is_empty()
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Whether the definition should be sent by reference instead of inline.
    #[must_use]
    pub fn definition_is_url(&self) -> bool {
        self.definition.starts_with("http://") || self.definition.starts_with("https://")
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with exactly one trailing slash, ready for joining endpoint names.
    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Reject values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero timeout or a base URL
    /// that is not `http(s)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "compute.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if !self.base_url.is_empty()
            && !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "compute.base_url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.base_url),
            });
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also require a definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when [`is_configured`](Self::is_configured)
    /// is false, otherwise whatever `validate` returns.
    pub fn require(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "compute".into(),
            });
        }
        self.validate()
    }
}
