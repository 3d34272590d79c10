use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use urbis_geometry::artifact::{ContainerInfo, decode, extract_payload, inspect, is_valid_container};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ArtifactCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct InspectResponse {
    source: String,
    size: usize,
    container: Option<ContainerInfo>,
    consistent: bool,
    payload: Option<Value>,
}

impl InspectResponse {
    fn new(source: String, bytes: &[u8]) -> Self {
        let container = inspect(bytes);
        Self {
            source,
            size: bytes.len(),
            consistent: container.as_ref().is_some_and(ContainerInfo::is_consistent),
            container,
            payload: extract_payload(bytes),
        }
    }
}

/// Handle `urb artifact`.
pub async fn handle(
    action: &ArtifactCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let ArtifactCommands::Inspect { building, file } = action;
    let response = match (building, file) {
        (Some(id), _) => {
            let entity = ctx.service.store().fetch(id).await?;
            let artifact = entity
                .building()
                .and_then(|b| b.geometry.artifact())
                .with_context(|| format!("{id} has no cached geometry"))?;
            let bytes = decode(artifact).context("cached artifact is not valid base64")?;
            InspectResponse::new(id.clone(), &bytes)
        }
        (None, Some(path)) => InspectResponse::new(path.clone(), &read_artifact_file(path)?),
        (None, None) => anyhow::bail!("either --building or --file is required"),
    };
    output(&response, flags.format)
}

/// A file holds either the binary container or its base64 transport form.
fn read_artifact_file(path: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    if is_valid_container(&bytes) {
        return Ok(bytes);
    }
    let text = std::str::from_utf8(&bytes)
        .with_context(|| format!("{path} is neither a container nor base64 text"))?;
    decode(text).with_context(|| format!("{path} is neither a container nor base64 text"))
}
