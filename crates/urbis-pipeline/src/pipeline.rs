//! `ensure_geometry`: validation → cache check → compute → extraction → persist.
//!
//! Cache decisions follow [`CacheState`]. A request starts in the stored
//! state (`uncached` or `cached`), moves to `computing` on a miss, and ends in
//! `cached` after a successful compute or back in `uncached` after a failure.
//! A failure never touches the stored record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;

use urbis_compute::{ComputeEngine, ComputeError, assemble_request, extract_artifact};
use urbis_config::ComputeConfig;
use urbis_core::entities::{Entity, GeometryCache};
use urbis_core::enums::{CacheState, EntityKind, GeometrySource, LevelOfDetail};
use urbis_core::errors::CoreError;
use urbis_core::properties::EffectiveProperties;
use urbis_core::responses::{GeometryRefresh, GeometryStatusResponse};
use urbis_core::store::{self, EntityStore};
use urbis_geometry::artifact::{decode, is_valid_container, to_transport};
use urbis_geometry::{fingerprint, validate_for_building_footprint};

use crate::error::PipelineError;

/// Runtime knobs, usually taken from the `compute` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub offline: bool,
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&ComputeConfig::default())
    }
}

impl From<&ComputeConfig> for PipelineConfig {
    fn from(config: &ComputeConfig) -> Self {
        Self {
            offline: config.offline,
            timeout: config.timeout(),
        }
    }
}

/// The building returned by [`GeometryPipeline::ensure_geometry`] and how its
/// geometry was obtained.
#[derive(Debug, Clone)]
pub struct GeometryOutcome {
    pub building: Entity,
    pub source: GeometrySource,
}

pub struct GeometryPipeline {
    store: Arc<dyn EntityStore>,
    engine: Arc<dyn ComputeEngine>,
    config: PipelineConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GeometryPipeline {
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        engine: Arc<dyn ComputeEngine>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            engine,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Make sure the building has valid geometry for `lod`, computing it if
    /// the stored record is missing, stale, for another lod, or `force` is set.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] for an unknown id
    /// - [`PipelineError::Validation`] for a non-building or a bad footprint
    /// - [`PipelineError::Integrity`] for a broken ancestry
    /// - [`PipelineError::Compute`] / [`PipelineError::Extraction`] when the
    ///   engine fails; the stored building is unchanged
    pub async fn ensure_geometry(
        &self,
        building_id: &str,
        lod: LevelOfDetail,
        force: bool,
    ) -> Result<GeometryOutcome, PipelineError> {
        if !force {
            let building = self.load_building(building_id).await?;
            let inputs = self.inputs(&building, lod).await?;
            if inputs.is_hit(&building, lod) {
                tracing::debug!(building = building_id, %lod, "geometry cache hit");
                return Ok(GeometryOutcome {
                    building,
                    source: GeometrySource::CacheHit,
                });
            }
        }

        let lock = self.building_lock(building_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.ensure_locked(building_id, lod, force).await
        };
        self.release_lock(building_id, lock).await;
        result
    }

    async fn ensure_locked(
        &self,
        building_id: &str,
        lod: LevelOfDetail,
        force: bool,
    ) -> Result<GeometryOutcome, PipelineError> {
        // Another caller may have computed while we waited.
        let building = self.load_building(building_id).await?;
        let inputs = self.inputs(&building, lod).await?;
        let stored = building
            .building()
            .map_or(CacheState::Uncached, |b| b.geometry.state());
        if !force && inputs.is_hit(&building, lod) {
            tracing::debug!(building = building_id, %lod, "geometry cache hit after wait");
            return Ok(GeometryOutcome {
                building,
                source: GeometrySource::CacheHit,
            });
        }
        tracing::debug!(
            building = building_id,
            %lod,
            force,
            validity = ?building.building().map(|b| b.geometry.validity(&inputs.fingerprint, lod)),
            "geometry cache miss"
        );
        let state = transition(building_id, stored, CacheState::Computing)?;

        if self.config.offline {
            let mut building = building;
            let computed_at = building.updated_at;
            if let Some(attrs) = building.building_mut() {
                attrs
                    .geometry
                    .record(String::new(), inputs.fingerprint, lod, computed_at);
            }
            tracing::info!(building = building_id, %lod, "offline mode, skipping compute");
            return Ok(GeometryOutcome {
                building,
                source: GeometrySource::Offline,
            });
        }

        let artifact = match self.compute(&building, &inputs).await {
            Ok(artifact) => artifact,
            Err(err) => {
                transition(building_id, state, CacheState::Uncached)?;
                tracing::warn!(building = building_id, error = %err, "geometry compute failed");
                return Err(err);
            }
        };
        transition(building_id, state, CacheState::Cached)?;

        // Write onto a fresh copy so concurrent override edits are not lost.
        let mut fresh = self.load_building(building_id).await?;
        if let Some(attrs) = fresh.building_mut() {
            attrs
                .geometry
                .record(artifact, inputs.fingerprint, lod, chrono::Utc::now());
        }
        self.store.update(&fresh).await?;
        tracing::info!(building = building_id, %lod, "geometry computed and cached");
        Ok(GeometryOutcome {
            building: fresh,
            source: GeometrySource::Computed,
        })
    }

    /// Drop a building's cached geometry. Returns whether anything was cleared.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Validation` for an id that is not a building, or store failures.
    pub async fn invalidate(&self, building_id: &str) -> Result<bool, PipelineError> {
        let lock = self.building_lock(building_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.invalidate_locked(building_id).await
        };
        self.release_lock(building_id, lock).await;
        result
    }

    async fn invalidate_locked(&self, building_id: &str) -> Result<bool, PipelineError> {
        let mut building = self.load_building(building_id).await?;
        let cleared = building
            .building_mut()
            .is_some_and(|attrs| attrs.geometry.clear());
        if cleared {
            self.store.update(&building).await?;
            tracing::info!(building = building_id, "geometry cache invalidated");
        }
        Ok(cleared)
    }

    /// Report the cache validity for `lod` without computing anything.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Validation` for a non-building, `Integrity` for a broken
    /// ancestry, or store failures.
    pub async fn cache_status(
        &self,
        building_id: &str,
        lod: LevelOfDetail,
    ) -> Result<GeometryStatusResponse, PipelineError> {
        let building = self.load_building(building_id).await?;
        let effective = store::effective_properties(self.store.as_ref(), &building).await?;
        let footprint = building.building().and_then(|b| b.footprint.as_ref());
        let fingerprint = fingerprint(footprint, &effective, lod);
        let empty = GeometryCache::default();
        let cache = building.building().map_or(&empty, |b| &b.geometry);
        Ok(GeometryStatusResponse {
            building_id: building.id.clone(),
            lod,
            validity: cache.validity(&fingerprint, lod),
            fingerprint,
            cached_fingerprint: cache.fingerprint().map(str::to_string),
            computed_at: cache.computed_at(),
        })
    }

    /// Run `ensure_geometry` for each building, turning failures into warnings.
    pub async fn refresh(&self, buildings: &[Entity], lod: LevelOfDetail) -> Vec<GeometryRefresh> {
        let mut out = Vec::with_capacity(buildings.len());
        for building in buildings {
            let refresh = match self.ensure_geometry(&building.id, lod, false).await {
                Ok(outcome) => GeometryRefresh {
                    building_id: building.id.clone(),
                    source: Some(outcome.source),
                    warning: None,
                },
                Err(err) => GeometryRefresh {
                    building_id: building.id.clone(),
                    source: None,
                    warning: Some(err.to_string()),
                },
            };
            out.push(refresh);
        }
        out
    }

    /// Whether the compute engine is reachable. Always true offline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Compute`] on transport failures.
    pub async fn health(&self) -> Result<bool, PipelineError> {
        if self.config.offline {
            return Ok(true);
        }
        Ok(self.engine.health().await?)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn building_lock(&self, building_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(building_id.to_string()).or_default())
    }

    /// Drop our handle and forget the lock once nobody else holds or awaits it.
    async fn release_lock(&self, building_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(building_id)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            locks.remove(building_id);
        }
    }

    async fn load_building(&self, building_id: &str) -> Result<Entity, PipelineError> {
        let entity = self
            .store
            .get(building_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::Building.as_str(), building_id))?;
        if entity.kind() != EntityKind::Building {
            return Err(PipelineError::Validation {
                errors: vec![format!("{building_id} is a {}, not a building", entity.kind())],
            });
        }
        Ok(entity)
    }

    async fn inputs(
        &self,
        building: &Entity,
        lod: LevelOfDetail,
    ) -> Result<ComputeInputs, PipelineError> {
        let footprint = checked_footprint(building)?.clone();
        let effective = store::effective_properties(self.store.as_ref(), building).await?;
        let fingerprint = fingerprint(Some(&footprint), &effective, lod);
        Ok(ComputeInputs {
            footprint,
            effective,
            fingerprint,
        })
    }

    async fn compute(
        &self,
        building: &Entity,
        inputs: &ComputeInputs,
    ) -> Result<String, PipelineError> {
        let request = assemble_request(&inputs.footprint, &building.name, &inputs.effective);
        tracing::info!(building = %building.id, "requesting geometry compute");

        let response = tokio::time::timeout(self.config.timeout, self.engine.evaluate(&request))
            .await
            .map_err(|_| ComputeError::Timeout {
                secs: self.config.timeout.as_secs(),
            })??;

        let extracted = extract_artifact(&response)?;
        tracing::debug!(
            building = %building.id,
            param = %extracted.param_name,
            by_marker = extracted.by_marker,
            "extracted artifact"
        );
        let artifact = to_transport(&extracted.data);
        if !decode(&artifact).is_ok_and(|bytes| is_valid_container(&bytes)) {
            tracing::warn!(building = %building.id, "artifact is not a binary glTF container");
        }
        Ok(artifact)
    }
}

struct ComputeInputs {
    footprint: Value,
    effective: EffectiveProperties,
    fingerprint: String,
}

impl ComputeInputs {
    fn is_hit(&self, building: &Entity, lod: LevelOfDetail) -> bool {
        building
            .building()
            .is_some_and(|b| b.geometry.is_valid_for(&self.fingerprint, lod))
    }
}

fn checked_footprint(building: &Entity) -> Result<&Value, PipelineError> {
    let Some(footprint) = building.building().and_then(|b| b.footprint.as_ref()) else {
        return Err(PipelineError::Validation {
            errors: vec![format!("Building {} has no footprint", building.id)],
        });
    };
    let report = validate_for_building_footprint(footprint);
    if !report.ok {
        return Err(PipelineError::Validation {
            errors: report.errors,
        });
    }
    Ok(footprint)
}

fn transition(
    building_id: &str,
    from: CacheState,
    to: CacheState,
) -> Result<CacheState, PipelineError> {
    if !from.can_transition_to(to) {
        return Err(CoreError::InvalidTransition {
            entity_type: EntityKind::Building.as_str().into(),
            id: building_id.into(),
            from: from.as_str().into(),
            to: to.as_str().into(),
        }
        .into());
    }
    tracing::debug!(building = building_id, %from, %to, "cache state");
    Ok(to)
}
