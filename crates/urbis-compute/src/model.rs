//! Wire model of the Grasshopper compute endpoint.
//!
//! A request carries the definition (inline as base64 in `algo`, or by URL in
//! `pointer`) and one [`DataTree`] per input parameter. The response echoes
//! the same tree shape for each output parameter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Item type tag used for every input value.
pub const STRING_TYPE: &str = "System.String";

/// One value in a data tree branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl DataItem {
    #[must_use]
    pub fn string(data: impl Into<String>) -> Self {
        Self {
            kind: STRING_TYPE.to_string(),
            data: Value::String(data.into()),
        }
    }

    /// The payload, when it is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.data.as_str()
    }
}

/// A named parameter with branches keyed by path (`{0}`, `{0;0}`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTree {
    #[serde(rename = "ParamName")]
    pub param_name: String,
    #[serde(rename = "InnerTree", default)]
    pub inner_tree: BTreeMap<String, Vec<DataItem>>,
}

impl DataTree {
    #[must_use]
    pub fn new(param_name: impl Into<String>) -> Self {
        Self {
            param_name: param_name.into(),
            inner_tree: BTreeMap::new(),
        }
    }

    /// Add items under the branch at `path`.
    #[must_use]
    pub fn append(mut self, path: &[usize], items: Vec<DataItem>) -> Self {
        self.inner_tree
            .entry(branch_key(path))
            .or_default()
            .extend(items);
        self
    }

    /// Every item across all branches, in path order.
    pub fn items(&self) -> impl Iterator<Item = &DataItem> {
        self.inner_tree.values().flatten()
    }
}

/// Render a branch path the way the compute server keys it.
#[must_use]
pub fn branch_key(path: &[usize]) -> String {
    let parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    format!("{{{}}}", parts.join(";"))
}

/// Body of `POST /grasshopper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub algo: Option<String>,
    pub pointer: Option<String>,
    pub values: Vec<DataTree>,
}

impl ComputeRequest {
    /// A request whose definition is filled in by the engine.
    #[must_use]
    pub const fn with_inputs(values: Vec<DataTree>) -> Self {
        Self {
            algo: None,
            pointer: None,
            values,
        }
    }

    #[must_use]
    pub fn has_definition(&self) -> bool {
        self.algo.is_some() || self.pointer.is_some()
    }
}

/// Body returned by the compute server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeResponse {
    #[serde(default)]
    pub values: Vec<DataTree>,
}
