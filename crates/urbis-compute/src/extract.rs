//! Locating the geometry artifact in a compute response.
//!
//! Output parameters whose name contains one of [`OUTPUT_MARKERS`]
//! (case-insensitive) are searched first, in response order, and their first
//! non-empty string item wins. Without a marked parameter the longest string
//! item anywhere in the response is taken. That fallback is best-effort: it
//! keeps older definitions with unnamed outputs working, but may pick the
//! wrong value when a definition returns several large strings.

use crate::error::ComputeError;
use crate::model::ComputeResponse;

/// Substrings that mark an output parameter as the geometry file.
pub const OUTPUT_MARKERS: [&str; 2] = ["GLB", "FILE"];

/// An extracted artifact and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub data: String,
    pub param_name: String,
    /// `false` when the longest-string fallback was used.
    pub by_marker: bool,
}

#[must_use]
pub fn is_marked(param_name: &str) -> bool {
    let upper = param_name.to_uppercase();
    OUTPUT_MARKERS.iter().any(|m| upper.contains(m))
}

/// Pick the artifact string out of a response.
///
/// # Errors
///
/// Returns [`ComputeError::Extraction`] when the response holds no non-empty
/// string item.
pub fn extract_artifact(response: &ComputeResponse) -> Result<Extracted, ComputeError> {
    for tree in response.values.iter().filter(|t| is_marked(&t.param_name)) {
        if let Some(data) = tree.items().filter_map(|i| i.as_str()).find(|s| !s.is_empty()) {
            return Ok(Extracted {
                data: data.to_string(),
                param_name: tree.param_name.clone(),
                by_marker: true,
            });
        }
    }

    let mut best: Option<(&str, &str)> = None;
    for tree in &response.values {
        for data in tree.items().filter_map(|i| i.as_str()) {
            if best.is_none_or(|(current, _)| data.len() > current.len()) && !data.is_empty() {
                best = Some((data, &tree.param_name));
            }
        }
    }

    match best {
        Some((data, param_name)) => {
            tracing::warn!(param = param_name, "no marked output; using the longest string value");
            Ok(Extracted {
                data: data.to_string(),
                param_name: param_name.to_string(),
                by_marker: false,
            })
        }
        None => Err(ComputeError::Extraction(format!(
            "no geometry output in {} response value(s)",
            response.values.len()
        ))),
    }
}
