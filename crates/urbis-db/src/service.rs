//! Hierarchy service: entity creation, override edits, deletion and tree views
//! on top of any [`EntityStore`].
//!
//! The store itself only persists rows. This layer enforces the strict-tree
//! rules: a child is created under an existing parent exactly one kind level
//! above it, and is appended to that parent's ordered child list. Deletion
//! detaches the entity from its parent and never cascades.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use urbis_core::entities::{BuildingAttributes, Entity, EntityAttributes, FloorRange};
use urbis_core::enums::EntityKind;
use urbis_core::errors::CoreError;
use urbis_core::ids::generate_id;
use urbis_core::properties::{Overrides, PropertyKey};
use urbis_core::resolve::Ancestry;
use urbis_core::responses::{
    BuildingSummary, CacheStatusView, EntityDetailResponse, ResolveResponse, TreeNode,
};
use urbis_core::store::{self, EntityStore};
use urbis_geometry::validate_for_building_footprint;

/// Result of setting or clearing one override.
#[derive(Debug, Clone)]
pub struct OverrideChange {
    pub entity: Entity,
    /// Whether the stored overrides actually changed.
    pub changed: bool,
    /// Whether the key feeds the geometry fingerprint.
    pub geometry_affecting: bool,
}

impl OverrideChange {
    /// Buildings under this entity need their geometry refreshed.
    #[must_use]
    pub const fn needs_geometry_refresh(&self) -> bool {
        self.changed && self.geometry_affecting
    }
}

/// Result of editing a building's name or footprint.
#[derive(Debug, Clone)]
pub struct BuildingUpdate {
    pub entity: Entity,
    pub renamed: bool,
    pub footprint_changed: bool,
}

/// Hierarchy operations over a shared store.
#[derive(Clone)]
pub struct UrbanService {
    store: Arc<dyn EntityStore>,
}

impl UrbanService {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create a root project.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        overrides: Overrides,
    ) -> Result<Entity, CoreError> {
        let mut project = Entity::new(
            generate_id(EntityKind::Project)?,
            name.to_string(),
            None,
            EntityAttributes::Project {
                description: description.to_string(),
            },
            Utc::now(),
        );
        project.overrides = overrides;
        self.store.insert(&project).await?;
        tracing::info!(id = %project.id, name, "created project");
        Ok(project)
    }

    /// Create a site under a project.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown project, `Validation` if `project_id` is not a
    /// project, or store failures.
    pub async fn create_site(
        &self,
        project_id: &str,
        name: &str,
        boundary: Option<Value>,
        overrides: Overrides,
    ) -> Result<Entity, CoreError> {
        self.create_child(
            project_id,
            name,
            EntityAttributes::Site { boundary },
            overrides,
        )
        .await
    }

    /// Create a building under a site. The footprint should already have
    /// passed footprint validation; geometry is not computed here.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown site, `Validation` if `site_id` is not a
    /// site, or store failures.
    pub async fn create_building(
        &self,
        site_id: &str,
        name: &str,
        footprint: Value,
        overrides: Overrides,
    ) -> Result<Entity, CoreError> {
        self.create_child(
            site_id,
            name,
            EntityAttributes::Building(BuildingAttributes {
                footprint: Some(footprint),
                ..Default::default()
            }),
            overrides,
        )
        .await
    }

    /// Create a zone under a building.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown building, `Validation` if `building_id` is
    /// not a building, or store failures.
    pub async fn create_zone(
        &self,
        building_id: &str,
        name: &str,
        floor_range: FloorRange,
        overrides: Overrides,
    ) -> Result<Entity, CoreError> {
        self.create_child(
            building_id,
            name,
            EntityAttributes::Zone { floor_range },
            overrides,
        )
        .await
    }

    async fn create_child(
        &self,
        parent_id: &str,
        name: &str,
        attributes: EntityAttributes,
        overrides: Overrides,
    ) -> Result<Entity, CoreError> {
        let kind = attributes.kind();
        let expected = kind.parent_kind().map_or("entity", EntityKind::as_str);
        let mut parent = self
            .store
            .get(parent_id)
            .await?
            .ok_or_else(|| CoreError::not_found(expected, parent_id))?;

        if !parent.kind().can_parent(kind) {
            return Err(CoreError::Validation(format!(
                "a {kind} must be created under a {expected}, but {parent_id} is a {}",
                parent.kind()
            )));
        }

        let now = Utc::now();
        let mut child = Entity::new(
            generate_id(kind)?,
            name.to_string(),
            Some(parent.id.clone()),
            attributes,
            now,
        );
        child.overrides = overrides;
        self.store.insert(&child).await?;

        parent.children.push(child.id.clone());
        parent.updated_at = now;
        self.store.update(&parent).await?;

        tracing::info!(id = %child.id, %kind, parent = %parent.id, "created entity");
        Ok(child)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Set a local override on any entity.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or store failures.
    pub async fn set_override(
        &self,
        id: &str,
        key: &str,
        value: Value,
    ) -> Result<OverrideChange, CoreError> {
        let mut entity = self.store.fetch(id).await?;
        let changed = entity.overrides.get(key) != Some(&value);
        if changed {
            entity.set_override(key, value);
            self.store.update(&entity).await?;
            tracing::info!(id, key, "set override");
        }
        Ok(OverrideChange {
            entity,
            changed,
            geometry_affecting: is_geometry_key(key),
        })
    }

    /// Remove a local override so the value is inherited again.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or store failures.
    pub async fn clear_override(&self, id: &str, key: &str) -> Result<OverrideChange, CoreError> {
        let mut entity = self.store.fetch(id).await?;
        let changed = entity.clear_override(key);
        if changed {
            self.store.update(&entity).await?;
            tracing::info!(id, key, "cleared override");
        }
        Ok(OverrideChange {
            entity,
            changed,
            geometry_affecting: is_geometry_key(key),
        })
    }

    /// Rename a building and/or replace its footprint.
    ///
    /// A new footprint must pass footprint validation. The cached geometry
    /// record is kept; its fingerprint no longer matches once the footprint
    /// moves, so the next `ensure_geometry` sees it as stale.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Validation` if the id is not a building
    /// or the footprint is invalid, or store failures.
    pub async fn update_building(
        &self,
        id: &str,
        name: Option<&str>,
        footprint: Option<Value>,
    ) -> Result<BuildingUpdate, CoreError> {
        if let Some(footprint) = &footprint {
            let report = validate_for_building_footprint(footprint);
            if !report.ok {
                return Err(CoreError::Validation(format!(
                    "invalid footprint: {}",
                    report.errors.join("; ")
                )));
            }
        }

        let mut entity = self.store.fetch(id).await?;
        let kind = entity.kind();
        let Some(building) = entity.building_mut() else {
            return Err(CoreError::Validation(format!(
                "{id} is a {kind}, not a building"
            )));
        };

        let footprint_changed = footprint
            .as_ref()
            .is_some_and(|new| building.footprint.as_ref() != Some(new));
        if footprint_changed {
            building.footprint = footprint;
        }
        let renamed = match name {
            Some(new) if new != entity.name => {
                entity.name = new.to_string();
                true
            }
            _ => false,
        };

        if renamed || footprint_changed {
            entity.updated_at = Utc::now();
            self.store.update(&entity).await?;
            tracing::info!(id, renamed, footprint_changed, "updated building");
        }
        Ok(BuildingUpdate {
            entity,
            renamed,
            footprint_changed,
        })
    }

    /// Delete an entity and detach it from its parent's child list.
    ///
    /// Children are left in place; they become unreachable from the tree and
    /// report integrity errors on resolution.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, or store failures.
    pub async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        let entity = self.store.fetch(id).await?;
        if let Some(parent_id) = entity.parent_id.as_deref() {
            match self.store.get(parent_id).await? {
                Some(mut parent) => {
                    parent.children.retain(|c| c != id);
                    parent.updated_at = Utc::now();
                    self.store.update(&parent).await?;
                }
                None => tracing::warn!(id, parent_id, "deleting entity whose parent is missing"),
            }
        }
        if !entity.children.is_empty() {
            tracing::warn!(id, orphaned = entity.children.len(), "deleted entity still had children");
        }
        self.store.delete(id).await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// An entity with its effective property set.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Integrity` for a broken ancestry.
    pub async fn detail(&self, id: &str) -> Result<EntityDetailResponse, CoreError> {
        let entity = self.store.fetch(id).await?;
        let effective_properties = store::effective_properties(self.store.as_ref(), &entity).await?;
        Ok(EntityDetailResponse {
            entity,
            effective_properties,
        })
    }

    /// Resolve one property, reporting which entity supplied it.
    ///
    /// Keys outside the fixed set fall back to `null`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Integrity` for a broken ancestry.
    pub async fn resolve(&self, id: &str, key: &str) -> Result<ResolveResponse, CoreError> {
        let entity = self.store.fetch(id).await?;
        let ancestry = store::ancestry(self.store.as_ref(), &entity).await?;
        let (value, source) = match ancestry.resolve_with_source(key) {
            Some((value, source)) => (value.clone(), Some(source.to_string())),
            None => (
                PropertyKey::from_name(key).map_or(Value::Null, PropertyKey::default_value),
                None,
            ),
        };
        Ok(ResolveResponse {
            id: entity.id,
            key: key.to_string(),
            value,
            source,
        })
    }

    /// Buildings whose geometry depends on `entity`'s overrides: the entity
    /// itself for a building, every descendant building for a project or
    /// site, nothing for a zone.
    ///
    /// # Errors
    ///
    /// `Integrity` if a listed child is missing, or store failures.
    pub async fn affected_buildings(&self, entity: &Entity) -> Result<Vec<Entity>, CoreError> {
        match entity.kind() {
            EntityKind::Building => Ok(vec![entity.clone()]),
            EntityKind::Zone => Ok(Vec::new()),
            EntityKind::Site => Ok(self
                .store
                .children(entity)
                .await?
                .into_iter()
                .filter(|c| c.kind() == EntityKind::Building)
                .collect()),
            EntityKind::Project => {
                let mut out = Vec::new();
                for site in self.store.children(entity).await? {
                    out.extend(
                        self.store
                            .children(&site)
                            .await?
                            .into_iter()
                            .filter(|c| c.kind() == EntityKind::Building),
                    );
                }
                Ok(out)
            }
        }
    }

    /// Nested project → site → building view with effective properties and
    /// building cache summaries.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Validation` if the id is not a project,
    /// `Integrity` for a missing child.
    pub async fn project_tree(&self, project_id: &str) -> Result<TreeNode, CoreError> {
        let project = self.store.fetch(project_id).await?;
        if project.kind() != EntityKind::Project {
            return Err(CoreError::Validation(format!(
                "{project_id} is a {}, not a project",
                project.kind()
            )));
        }

        let mut site_nodes = Vec::new();
        for site in self.store.children(&project).await? {
            let mut building_nodes = Vec::new();
            for building in self.store.children(&site).await? {
                let chain = vec![building, site.clone(), project.clone()];
                building_nodes.push(tree_node(&Ancestry::new(chain)?, Vec::new()));
            }
            let chain = vec![site, project.clone()];
            site_nodes.push(tree_node(&Ancestry::new(chain)?, building_nodes));
        }

        Ok(tree_node(&Ancestry::new(vec![project])?, site_nodes))
    }
}

fn is_geometry_key(key: &str) -> bool {
    PropertyKey::from_name(key).is_some_and(PropertyKey::is_geometry_affecting)
}

fn tree_node(ancestry: &Ancestry, children: Vec<TreeNode>) -> TreeNode {
    let entity = ancestry.entity();
    let effective_properties = ancestry.effective_properties();
    let building = entity.building().map(|b| BuildingSummary {
        footprint: b.footprint.clone(),
        total_height: effective_properties.total_height(),
        cache_status: CacheStatusView {
            cached: b.geometry.entry().is_some(),
            cache_timestamp: b.geometry.computed_at(),
            cache_lod: b
                .geometry
                .entry()
                .map(|_| b.geometry.level_of_detail()),
        },
    });
    TreeNode {
        uid: entity.id.clone(),
        name: entity.name.clone(),
        kind: entity.kind(),
        overrides: entity.overrides.clone(),
        effective_properties,
        building,
        children,
    }
}
