//! CLI response types returned as JSON by `urb` commands.
//!
//! These structs define the shape of JSON output for commands like
//! `urb tree`, `urb effective`, `urb resolve`, and `urb geometry status`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::Entity;
use crate::enums::{CacheValidity, EntityKind, GeometrySource, LevelOfDetail};
use crate::properties::{EffectiveProperties, Overrides};

/// One node of `urb tree`. Projects nest sites, sites nest buildings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TreeNode {
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub overrides: Overrides,
    pub effective_properties: EffectiveProperties,
    #[serde(flatten)]
    pub building: Option<BuildingSummary>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// Building-only fields of a [`TreeNode`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BuildingSummary {
    pub footprint: Option<Value>,
    pub total_height: f64,
    pub cache_status: CacheStatusView,
}

/// Summary of a building's stored geometry cache record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CacheStatusView {
    pub cached: bool,
    pub cache_timestamp: Option<DateTime<Utc>>,
    pub cache_lod: Option<LevelOfDetail>,
}

/// Response from `urb get` and `urb effective`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EntityDetailResponse {
    pub entity: Entity,
    pub effective_properties: EffectiveProperties,
}

/// Response from `urb resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResolveResponse {
    pub id: String,
    pub key: String,
    pub value: Value,
    /// Id of the entity whose override supplied the value; `None` when the
    /// default was used.
    pub source: Option<String>,
}

/// Response from `urb geometry status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeometryStatusResponse {
    pub building_id: String,
    pub lod: LevelOfDetail,
    pub validity: CacheValidity,
    pub fingerprint: String,
    pub cached_fingerprint: Option<String>,
    pub computed_at: Option<DateTime<Utc>>,
}

/// Result of refreshing one building's geometry after a mutation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeometryRefresh {
    pub building_id: String,
    pub source: Option<GeometrySource>,
    /// Set when the refresh failed. The mutation itself still succeeded.
    pub warning: Option<String>,
}

/// Response from commands that mutate an entity and may refresh geometry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MutationResponse {
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<GeometryRefresh>,
}

impl From<Entity> for MutationResponse {
    fn from(entity: Entity) -> Self {
        Self {
            entity,
            geometry: Vec::new(),
        }
    }
}

/// Response from `urb delete`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
}
