//! Entity kinds, level of detail, and geometry cache enums for Urbis.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `EntityKind` encodes the fixed hierarchy ordering; `CacheState` provides
//! `allowed_next_states()` for the building geometry cache state machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of node in the urban hierarchy.
///
/// ```text
/// project → site → building → zone
/// ```
///
/// A child's kind is always exactly one level below its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Site,
    Building,
    Zone,
}

impl EntityKind {
    /// Number of levels in the hierarchy. Bounds every ancestry walk.
    pub const DEPTH: usize = 4;

    /// The kind a parent of this kind must have. `None` for the root.
    #[must_use]
    pub const fn parent_kind(self) -> Option<Self> {
        match self {
            Self::Project => None,
            Self::Site => Some(Self::Project),
            Self::Building => Some(Self::Site),
            Self::Zone => Some(Self::Building),
        }
    }

    /// The kind children of this kind must have. `None` for the leaf.
    #[must_use]
    pub const fn child_kind(self) -> Option<Self> {
        match self {
            Self::Project => Some(Self::Site),
            Self::Site => Some(Self::Building),
            Self::Building => Some(Self::Zone),
            Self::Zone => None,
        }
    }

    /// Check whether an entity of this kind may be the parent of `child`.
    #[must_use]
    pub fn can_parent(self, child: Self) -> bool {
        self.child_kind() == Some(child)
    }

    /// ID prefix for entities of this kind, e.g. `bld-a3f8b2c1`.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Project => "prj",
            Self::Site => "sit",
            Self::Building => "bld",
            Self::Zone => "zon",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Site => "site",
            Self::Building => "building",
            Self::Zone => "zone",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LevelOfDetail
// ---------------------------------------------------------------------------

/// Fidelity of the geometry produced by the compute engine. Part of the cache key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelOfDetail {
    Low,
    #[default]
    Medium,
    High,
}

impl LevelOfDetail {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for LevelOfDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CacheState
// ---------------------------------------------------------------------------

/// Geometry cache state of a building.
///
/// ```text
/// uncached → computing → cached
///            computing → uncached   (compute or extraction failed)
/// cached   → computing              (fingerprint or lod mismatch, or forced)
/// ```
///
/// A failed compute returns to `uncached` for the request even when an older
/// record is still stored; the stored record is never cleared by a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Uncached,
    Computing,
    Cached,
}

impl CacheState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Uncached | Self::Cached => &[Self::Computing],
            Self::Computing => &[Self::Cached, Self::Uncached],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uncached => "uncached",
            Self::Computing => "computing",
            Self::Cached => "cached",
        }
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CacheValidity
// ---------------------------------------------------------------------------

/// Result of checking a stored cache record against a freshly computed fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheValidity {
    /// Record exists, lod matches, fingerprint matches.
    Valid,
    /// No record stored.
    Missing,
    /// Record exists for another level of detail.
    LodMismatch,
    /// Record exists for this lod but inputs changed since it was computed.
    Stale,
}

impl CacheValidity {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Missing => "missing",
            Self::LodMismatch => "lod_mismatch",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for CacheValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GeometrySource
// ---------------------------------------------------------------------------

/// How `ensure_geometry` obtained the artifact it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// The stored record was valid; the engine was not called.
    CacheHit,
    /// The engine was called and the result persisted.
    Computed,
    /// Offline mode: an empty, unpersisted record.
    Offline,
}

impl GeometrySource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::Computed => "computed",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
