//! The entity store abstraction.
//!
//! Everything above the storage layer (resolver walks, the hierarchy service,
//! the geometry pipeline) talks to entities through [`EntityStore`]. Adapters
//! live in `urbis-db`.

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::Entity;
use crate::enums::EntityKind;
use crate::errors::CoreError;
use crate::properties::EffectiveProperties;
use crate::resolve::Ancestry;

/// Keyed persistence for hierarchy entities.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch an entity by id. `Ok(None)` when absent.
    async fn get(&self, id: &str) -> Result<Option<Entity>, CoreError>;

    /// Persist a new entity. Fails if the id is already taken.
    async fn insert(&self, entity: &Entity) -> Result<(), CoreError>;

    /// Replace a stored entity. Fails with `NotFound` if it does not exist.
    async fn update(&self, entity: &Entity) -> Result<(), CoreError>;

    /// Remove an entity. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, CoreError>;

    /// All entities, optionally of one kind, ordered by creation time.
    async fn list(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, CoreError>;

    /// Like [`get`](Self::get) but absence is an error.
    async fn fetch(&self, id: &str) -> Result<Entity, CoreError> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("entity", id))
    }

    /// The parent of `entity`, or `None` for a project.
    ///
    /// A dangling `parent_id` is an integrity error, not a `NotFound`.
    async fn parent(&self, entity: &Entity) -> Result<Option<Entity>, CoreError> {
        let Some(parent_id) = entity.parent_id.as_deref() else {
            return Ok(None);
        };
        match self.get(parent_id).await? {
            Some(parent) => Ok(Some(parent)),
            None => Err(CoreError::Integrity(format!(
                "{} {} references missing parent {parent_id}",
                entity.kind(),
                entity.id
            ))),
        }
    }

    /// Children of `entity` in their stored order.
    async fn children(&self, entity: &Entity) -> Result<Vec<Entity>, CoreError> {
        let mut out = Vec::with_capacity(entity.children.len());
        for child_id in &entity.children {
            let child = self.get(child_id).await?.ok_or_else(|| {
                CoreError::Integrity(format!(
                    "{} {} lists missing child {child_id}",
                    entity.kind(),
                    entity.id
                ))
            })?;
            out.push(child);
        }
        Ok(out)
    }
}

/// Load and verify the ancestry chain of `entity`.
///
/// The walk is bounded by the hierarchy depth, so a cycle in stored data ends
/// in an integrity error rather than looping.
///
/// # Errors
///
/// Propagates store failures; returns [`CoreError::Integrity`] for a missing
/// parent, a kind mismatch, a missing project root, or a cycle.
pub async fn ancestry(store: &dyn EntityStore, entity: &Entity) -> Result<Ancestry, CoreError> {
    let mut chain = vec![entity.clone()];
    let mut current = entity.clone();
    loop {
        let Some(parent) = store.parent(&current).await? else {
            break;
        };
        if chain.len() >= EntityKind::DEPTH {
            return Err(CoreError::Integrity(format!(
                "ancestry of {} exceeds hierarchy depth",
                entity.id
            )));
        }
        chain.push(parent.clone());
        current = parent;
    }
    Ancestry::new(chain)
}

/// Resolve one property of `entity` through the store.
///
/// # Errors
///
/// See [`ancestry`].
pub async fn resolve(
    store: &dyn EntityStore,
    entity: &Entity,
    name: &str,
    fallback: Value,
) -> Result<Value, CoreError> {
    Ok(ancestry(store, entity).await?.resolve(name, fallback))
}

/// Effective property set of `entity` through the store.
///
/// # Errors
///
/// See [`ancestry`].
pub async fn effective_properties(
    store: &dyn EntityStore,
    entity: &Entity,
) -> Result<EffectiveProperties, CoreError> {
    Ok(ancestry(store, entity).await?.effective_properties())
}
