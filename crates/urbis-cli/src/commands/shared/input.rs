use std::path::Path;

use anyhow::Context;
use serde_json::Value;

/// Read and parse a JSON (GeoJSON) file.
pub fn read_json_file(path: &str) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("{path} is not valid JSON"))
}
