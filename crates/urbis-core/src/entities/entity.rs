use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::building::BuildingAttributes;
use crate::enums::EntityKind;
use crate::properties::Overrides;

/// A node in the project → site → building → zone hierarchy.
///
/// `parent_id` is a back-reference used only for upward traversal. Children are
/// an ordered list of ids resolved through the store on demand.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Absent only for projects.
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    /// Local property overrides. Keys outside the known set are kept as-is.
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(flatten)]
    pub attributes: EntityAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind-specific attributes, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityAttributes {
    Project {
        #[serde(default)]
        description: String,
    },
    Site {
        /// GeoJSON boundary of the land parcel.
        #[serde(default)]
        boundary: Option<serde_json::Value>,
    },
    Building(BuildingAttributes),
    Zone {
        #[serde(default)]
        floor_range: FloorRange,
    },
}

impl EntityAttributes {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Project { .. } => EntityKind::Project,
            Self::Site { .. } => EntityKind::Site,
            Self::Building(_) => EntityKind::Building,
            Self::Zone { .. } => EntityKind::Zone,
        }
    }
}

/// Floors a zone spans. Kept as strings to accept labels like `"B1"`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FloorRange {
    pub start: String,
    pub end: String,
}

impl Default for FloorRange {
    fn default() -> Self {
        Self {
            start: "1".into(),
            end: "1".into(),
        }
    }
}

impl Entity {
    /// Build a new entity with no children and no overrides.
    #[must_use]
    pub fn new(
        id: String,
        name: String,
        parent_id: Option<String>,
        attributes: EntityAttributes,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            parent_id,
            children: Vec::new(),
            overrides: Overrides::new(),
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.attributes.kind()
    }

    #[must_use]
    pub const fn building(&self) -> Option<&BuildingAttributes> {
        match &self.attributes {
            EntityAttributes::Building(b) => Some(b),
            _ => None,
        }
    }

    pub fn building_mut(&mut self) -> Option<&mut BuildingAttributes> {
        match &mut self.attributes {
            EntityAttributes::Building(b) => Some(b),
            _ => None,
        }
    }

    /// Set a local override, replacing any previous value.
    pub fn set_override(&mut self, key: &str, value: serde_json::Value) {
        self.overrides.insert(key.to_string(), value);
        self.updated_at = Utc::now();
    }

    /// Remove a local override so the value is inherited again.
    /// Returns whether the key was present.
    pub fn clear_override(&mut self, key: &str) -> bool {
        let removed = self.overrides.remove(key).is_some();
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}
