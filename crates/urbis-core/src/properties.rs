//! The fixed effective property set and its system-wide defaults.
//!
//! Overrides are free-form (`key → JSON value`), but only the keys in
//! [`PropertyKey::ALL`] make up an entity's effective properties. Three of them
//! (`num_floors`, `floor_height`, `setback`) feed the geometry cache key.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Local overrides of an entity.
pub type Overrides = BTreeMap<String, Value>;

/// A property in the fixed effective set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    NumFloors,
    FloorHeight,
    Setback,
    UseType,
    GfaRatio,
    Color,
}

impl PropertyKey {
    pub const ALL: [Self; 6] = [
        Self::NumFloors,
        Self::FloorHeight,
        Self::Setback,
        Self::UseType,
        Self::GfaRatio,
        Self::Color,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NumFloors => "num_floors",
            Self::FloorHeight => "floor_height",
            Self::Setback => "setback",
            Self::UseType => "use_type",
            Self::GfaRatio => "gfa_ratio",
            Self::Color => "color",
        }
    }

    /// Look up a key by its override name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Value used when no entity in the chain, including the root, defines the key.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Self::NumFloors => json!(10),
            Self::FloorHeight => json!(3.5),
            Self::Setback => json!(5.0),
            Self::UseType => json!("residential"),
            Self::GfaRatio => json!(0.8),
            Self::Color => json!("#4A90D9"),
        }
    }

    /// Whether a change to this key must invalidate cached geometry.
    #[must_use]
    pub const fn is_geometry_affecting(self) -> bool {
        matches!(self, Self::NumFloors | Self::FloorHeight | Self::Setback)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved property set of one entity. Always contains every key of
/// [`PropertyKey::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EffectiveProperties(BTreeMap<String, Value>);

impl Default for EffectiveProperties {
    fn default() -> Self {
        Self::defaults()
    }
}

impl EffectiveProperties {
    /// The system-wide defaults for every key.
    #[must_use]
    pub fn defaults() -> Self {
        Self(
            PropertyKey::ALL
                .into_iter()
                .map(|key| (key.as_str().to_string(), key.default_value()))
                .collect(),
        )
    }

    /// Replace one key's value.
    #[must_use]
    pub fn with(mut self, key: PropertyKey, value: Value) -> Self {
        self.0.insert(key.as_str().to_string(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: PropertyKey) -> &Value {
        // Every constructor fills all keys, so the fallback is unreachable in practice.
        self.0.get(key.as_str()).unwrap_or(&Value::Null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.0
    }

    #[must_use]
    pub fn num_floors(&self) -> f64 {
        self.number(PropertyKey::NumFloors)
    }

    #[must_use]
    pub fn floor_height(&self) -> f64 {
        self.number(PropertyKey::FloorHeight)
    }

    #[must_use]
    pub fn setback(&self) -> f64 {
        self.number(PropertyKey::Setback)
    }

    #[must_use]
    pub fn use_type(&self) -> &str {
        self.get(PropertyKey::UseType).as_str().unwrap_or("residential")
    }

    #[must_use]
    pub fn color(&self) -> &str {
        self.get(PropertyKey::Color).as_str().unwrap_or("#4A90D9")
    }

    /// `num_floors × floor_height`.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.num_floors() * self.floor_height()
    }

    /// Read a numeric key. Numeric strings (`"12"`) are accepted; anything
    /// else falls back to the key's default.
    fn number(&self, key: PropertyKey) -> f64 {
        let value = self.get(key);
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            tracing::warn!(key = key.as_str(), %value, "non-numeric property value, using default");
            key.default_value().as_f64().unwrap_or_default()
        })
    }
}
