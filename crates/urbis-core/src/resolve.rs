//! Override/inheritance resolution over an ancestry chain.
//!
//! A value is taken from the nearest entity in the chain (self first) that
//! overrides it; when none does, the caller's fallback applies. The chain is
//! loaded from a store (see [`crate::store::ancestry`]) and checked here, so a
//! broken hierarchy surfaces as [`CoreError::Integrity`] instead of a silently
//! wrong value.

use serde_json::Value;

use crate::entities::Entity;
use crate::errors::CoreError;
use crate::properties::{EffectiveProperties, PropertyKey};

/// An entity followed by its ancestors, nearest first, ending at the project.
#[derive(Debug, Clone)]
pub struct Ancestry {
    chain: Vec<Entity>,
}

impl Ancestry {
    /// Build and verify a chain.
    ///
    /// Each link must point at the next entity by `parent_id`, sit exactly one
    /// kind level below it, and the chain must end at a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Integrity`] when the chain is empty, a link is
    /// broken, kinds are out of order, or the root is not a project.
    pub fn new(chain: Vec<Entity>) -> Result<Self, CoreError> {
        let Some(root) = chain.last() else {
            return Err(CoreError::Integrity("empty ancestry chain".into()));
        };
        if root.parent_id.is_some() || root.kind().parent_kind().is_some() {
            return Err(CoreError::Integrity(format!(
                "{} {} has no reachable project root",
                root.kind(),
                root.id
            )));
        }

        for pair in chain.windows(2) {
            let (child, parent) = (&pair[0], &pair[1]);
            if child.parent_id.as_deref() != Some(parent.id.as_str()) {
                return Err(CoreError::Integrity(format!(
                    "{} {} is not linked to parent {}",
                    child.kind(),
                    child.id,
                    parent.id
                )));
            }
            if !parent.kind().can_parent(child.kind()) {
                return Err(CoreError::Integrity(format!(
                    "{} {} cannot be the parent of {} {}",
                    parent.kind(),
                    parent.id,
                    child.kind(),
                    child.id
                )));
            }
        }

        Ok(Self { chain })
    }

    /// The entity the chain was built for.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.chain[0]
    }

    /// Entities nearest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.chain.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Resolve one property: nearest override wins, else `fallback`.
    #[must_use]
    pub fn resolve(&self, name: &str, fallback: Value) -> Value {
        self.resolve_with_source(name)
            .map_or(fallback, |(value, _)| value.clone())
    }

    /// The nearest override of `name` and the id of the entity defining it.
    #[must_use]
    pub fn resolve_with_source(&self, name: &str) -> Option<(&Value, &str)> {
        self.chain
            .iter()
            .find_map(|e| e.overrides.get(name).map(|v| (v, e.id.as_str())))
    }

    /// Resolve every key of the fixed set against its default.
    #[must_use]
    pub fn effective_properties(&self) -> EffectiveProperties {
        PropertyKey::ALL
            .into_iter()
            .fold(EffectiveProperties::defaults(), |props, key| {
                let value = self.resolve(key.as_str(), key.default_value());
                props.with(key, value)
            })
    }
}
