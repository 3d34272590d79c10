//! The compute engine seam and its HTTP adapter.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use urbis_config::ComputeConfig;

use crate::error::ComputeError;
use crate::http::check_response;
use crate::model::{ComputeRequest, ComputeResponse};

/// Something that can evaluate a parametric definition.
#[async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Evaluate the definition with the given input trees.
    async fn evaluate(&self, request: &ComputeRequest) -> Result<ComputeResponse, ComputeError>;

    /// Whether the engine is reachable.
    async fn health(&self) -> Result<bool, ComputeError>;
}

// ---------------------------------------------------------------------------
// HTTP adapter
// ---------------------------------------------------------------------------

/// How the definition travels with each request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Definition {
    /// Read from disk on every call and sent inline as base64.
    File(PathBuf),
    /// Sent as a pointer the server fetches itself.
    Url(String),
}

/// Client for a Grasshopper compute server (`/grasshopper`, `/version`).
pub struct HttpComputeEngine {
    http: reqwest::Client,
    base_url: String,
    definition: Option<Definition>,
    api_key: Option<String>,
}

impl HttpComputeEngine {
    /// Header carrying the optional API key.
    pub const API_KEY_HEADER: &'static str = "RhinoComputeKey";

    /// Build a client from the compute configuration.
    ///
    /// A missing definition is allowed here so that [`health`](ComputeEngine::health)
    /// works; [`evaluate`](ComputeEngine::evaluate) reports it.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Config`] for invalid settings and
    /// [`ComputeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ComputeConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("urbis/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        let definition = if config.definition.is_empty() {
            None
        } else if config.definition_is_url() {
            Some(Definition::Url(config.definition.clone()))
        } else {
            Some(Definition::File(PathBuf::from(&config.definition)))
        };
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            definition,
            api_key: config.has_api_key().then(|| config.api_key.clone()),
        })
    }

    #[must_use]
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}{name}", self.base_url)
    }

    /// Fill `algo` or `pointer` unless the caller already set one.
    async fn with_definition(
        &self,
        request: &ComputeRequest,
    ) -> Result<ComputeRequest, ComputeError> {
        let mut request = request.clone();
        if request.has_definition() {
            return Ok(request);
        }
        match &self.definition {
            Some(Definition::Url(url)) => request.pointer = Some(url.clone()),
            Some(Definition::File(path)) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| ComputeError::Definition {
                        path: path.display().to_string(),
                        source,
                    })?;
                request.algo = Some(STANDARD.encode(bytes));
            }
            None => {
                return Err(urbis_config::ConfigError::NotConfigured {
                    section: "compute.definition".into(),
                }
                .into());
            }
        }
        Ok(request)
    }
}

#[async_trait]
impl ComputeEngine for HttpComputeEngine {
    async fn evaluate(&self, request: &ComputeRequest) -> Result<ComputeResponse, ComputeError> {
        let body = self.with_definition(request).await?;
        let url = self.endpoint("grasshopper");
        tracing::debug!(%url, inputs = body.values.len(), "submitting compute request");

        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header(Self::API_KEY_HEADER, key);
        }
        let resp = check_response(builder.send().await?).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ComputeError::Parse(e.to_string()))
    }

    async fn health(&self) -> Result<bool, ComputeError> {
        let resp = self.http.get(self.endpoint("version")).send().await?;
        Ok(resp.status() == reqwest::StatusCode::OK)
    }
}
