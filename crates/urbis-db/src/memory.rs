//! In-memory [`EntityStore`], used by tests and `store.path = ":memory:"`
//! sessions that do not want a libSQL file.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use urbis_core::entities::Entity;
use urbis_core::enums::EntityKind;
use urbis_core::errors::CoreError;
use urbis_core::store::EntityStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<String, Entity>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Entity>, CoreError> {
        Ok(self.entities.read().await.get(id).cloned())
    }

    async fn insert(&self, entity: &Entity) -> Result<(), CoreError> {
        let mut entities = self.entities.write().await;
        if entities.contains_key(&entity.id) {
            return Err(CoreError::Validation(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        entities.insert(entity.id.clone(), entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &Entity) -> Result<(), CoreError> {
        let mut entities = self.entities.write().await;
        match entities.get_mut(&entity.id) {
            Some(stored) if stored.kind() == entity.kind() => {
                *stored = entity.clone();
                Ok(())
            }
            _ => Err(CoreError::not_found(entity.kind().as_str(), &entity.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.entities.write().await.remove(id).is_some())
    }

    async fn list(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, CoreError> {
        let entities = self.entities.read().await;
        let mut out: Vec<Entity> = entities
            .values()
            .filter(|e| kind.is_none_or(|k| e.kind() == k))
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(out)
    }
}
