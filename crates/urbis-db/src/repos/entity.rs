//! Entity repository: [`EntityStore`] over the `entities` table.

use async_trait::async_trait;

use urbis_core::entities::{Entity, EntityAttributes};
use urbis_core::enums::EntityKind;
use urbis_core::errors::CoreError;
use urbis_core::properties::Overrides;
use urbis_core::store::EntityStore;

use crate::UrbisDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json_column};

const SELECT_COLUMNS: &str =
    "SELECT id, kind, name, parent_id, children, overrides, attributes, created_at, updated_at
     FROM entities";

fn row_to_entity(row: &libsql::Row) -> Result<Entity, DatabaseError> {
    let id = row.get::<String>(0)?;
    let kind: EntityKind = parse_enum(&row.get::<String>(1)?)?;
    let children: Vec<String> = parse_json_column(&id, "children", &row.get::<String>(4)?)?;
    let overrides: Overrides = parse_json_column(&id, "overrides", &row.get::<String>(5)?)?;
    let attributes: EntityAttributes =
        parse_json_column(&id, "attributes", &row.get::<String>(6)?)?;

    if attributes.kind() != kind {
        return Err(DatabaseError::Corrupt {
            id,
            reason: format!(
                "kind column says {kind} but attributes describe a {}",
                attributes.kind()
            ),
        });
    }

    Ok(Entity {
        name: row.get::<String>(2)?,
        parent_id: get_opt_string(row, 3)?,
        children,
        overrides,
        attributes,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
        id,
    })
}

/// JSON-encoded columns of an entity: children, overrides, attributes.
fn json_columns(entity: &Entity) -> Result<(String, String, String), DatabaseError> {
    Ok((
        serde_json::to_string(&entity.children)?,
        serde_json::to_string(&entity.overrides)?,
        serde_json::to_string(&entity.attributes)?,
    ))
}

impl UrbisDb {
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_entity(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_entity(&self, entity: &Entity) -> Result<(), DatabaseError> {
        let (children, overrides, attributes) = json_columns(entity)?;
        self.conn()
            .execute(
                "INSERT INTO entities (id, kind, name, parent_id, children, overrides, attributes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    entity.id.as_str(),
                    entity.kind().as_str(),
                    entity.name.as_str(),
                    entity.parent_id.as_deref(),
                    children,
                    overrides,
                    attributes,
                    entity.created_at.to_rfc3339(),
                    entity.updated_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Returns the number of rows touched (0 when the id is unknown).
    async fn update_entity(&self, entity: &Entity) -> Result<u64, DatabaseError> {
        let (children, overrides, attributes) = json_columns(entity)?;
        let changed = self
            .conn()
            .execute(
                "UPDATE entities
                 SET name = ?2, parent_id = ?3, children = ?4, overrides = ?5, attributes = ?6, updated_at = ?7
                 WHERE id = ?1 AND kind = ?8",
                libsql::params![
                    entity.id.as_str(),
                    entity.name.as_str(),
                    entity.parent_id.as_deref(),
                    children,
                    overrides,
                    attributes,
                    entity.updated_at.to_rfc3339(),
                    entity.kind().as_str()
                ],
            )
            .await?;
        Ok(changed)
    }

    async fn delete_entity(&self, id: &str) -> Result<u64, DatabaseError> {
        Ok(self
            .conn()
            .execute("DELETE FROM entities WHERE id = ?1", [id])
            .await?)
    }

    async fn list_entities(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, DatabaseError> {
        let mut rows = match kind {
            Some(kind) => {
                self.conn()
                    .query(
                        &format!("{SELECT_COLUMNS} WHERE kind = ?1 ORDER BY created_at, id"),
                        [kind.as_str()],
                    )
                    .await?
            }
            None => {
                self.conn()
                    .query(&format!("{SELECT_COLUMNS} ORDER BY created_at, id"), ())
                    .await?
            }
        };
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_entity(&row)?);
        }
        Ok(out)
    }
}

#[async_trait]
impl EntityStore for UrbisDb {
    async fn get(&self, id: &str) -> Result<Option<Entity>, CoreError> {
        Ok(self.get_entity(id).await?)
    }

    async fn insert(&self, entity: &Entity) -> Result<(), CoreError> {
        if self.get_entity(&entity.id).await?.is_some() {
            return Err(CoreError::Validation(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        self.insert_entity(entity).await?;
        tracing::debug!(id = %entity.id, kind = %entity.kind(), "inserted entity");
        Ok(())
    }

    async fn update(&self, entity: &Entity) -> Result<(), CoreError> {
        if self.update_entity(entity).await? == 0 {
            return Err(CoreError::not_found(entity.kind().as_str(), &entity.id));
        }
        tracing::debug!(id = %entity.id, "updated entity");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.delete_entity(id).await? > 0)
    }

    async fn list(&self, kind: Option<EntityKind>) -> Result<Vec<Entity>, CoreError> {
        Ok(self.list_entities(kind).await?)
    }
}
