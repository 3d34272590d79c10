use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CacheState, CacheValidity, LevelOfDetail};

/// Building-specific attributes: the footprint and its geometry cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BuildingAttributes {
    /// GeoJSON footprint (Polygon, MultiPolygon, or a Feature/FeatureCollection of them).
    #[serde(default)]
    pub footprint: Option<serde_json::Value>,

    /// Cached compute output. Written only by the geometry pipeline.
    #[serde(default)]
    pub geometry: GeometryCache,
}

/// A computed artifact together with the fingerprint it was computed for.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CachedGeometry {
    /// Base64 transport form of the binary container.
    pub artifact: String,
    /// Hex SHA-256 of the geometry-affecting inputs.
    pub fingerprint: String,
    pub computed_at: DateTime<Utc>,
}

/// Geometry cache record of a building.
///
/// Artifact and fingerprint are stored together in one optional entry, so one
/// is present exactly when the other is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeometryCache {
    #[serde(default)]
    level_of_detail: LevelOfDetail,
    #[serde(default)]
    entry: Option<CachedGeometry>,
}

impl GeometryCache {
    #[must_use]
    pub const fn level_of_detail(&self) -> LevelOfDetail {
        self.level_of_detail
    }

    #[must_use]
    pub const fn entry(&self) -> Option<&CachedGeometry> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn artifact(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.artifact.as_str())
    }

    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.fingerprint.as_str())
    }

    #[must_use]
    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|e| e.computed_at)
    }

    /// Stored state, independent of any request.
    #[must_use]
    pub const fn state(&self) -> CacheState {
        if self.entry.is_some() {
            CacheState::Cached
        } else {
            CacheState::Uncached
        }
    }

    /// Compare the stored record against a freshly computed fingerprint.
    #[must_use]
    pub fn validity(&self, fingerprint: &str, lod: LevelOfDetail) -> CacheValidity {
        match &self.entry {
            None => CacheValidity::Missing,
            Some(_) if self.level_of_detail != lod => CacheValidity::LodMismatch,
            Some(entry) if entry.fingerprint != fingerprint => CacheValidity::Stale,
            Some(_) => CacheValidity::Valid,
        }
    }

    #[must_use]
    pub fn is_valid_for(&self, fingerprint: &str, lod: LevelOfDetail) -> bool {
        self.validity(fingerprint, lod).is_valid()
    }

    /// Replace the record with a freshly computed artifact.
    pub fn record(
        &mut self,
        artifact: String,
        fingerprint: String,
        lod: LevelOfDetail,
        computed_at: DateTime<Utc>,
    ) {
        self.level_of_detail = lod;
        self.entry = Some(CachedGeometry {
            artifact,
            fingerprint,
            computed_at,
        });
    }

    /// Drop the cached artifact. Returns whether anything was cleared.
    pub fn clear(&mut self) -> bool {
        self.level_of_detail = LevelOfDetail::default();
        self.entry.take().is_some()
    }
}
