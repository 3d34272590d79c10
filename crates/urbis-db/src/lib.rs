//! # urbis-db
//!
//! Entity persistence for Urbis.
//!
//! Two [`EntityStore`](urbis_core::store::EntityStore) adapters ship here:
//! [`UrbisDb`], backed by a local libSQL database, and [`MemoryStore`] for
//! tests and throwaway sessions. [`UrbanService`] sits on top of either and
//! enforces the hierarchy rules when entities are created, mutated or deleted.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29).

pub mod error;
pub mod helpers;
pub mod memory;
mod migrations;
pub mod repos;
pub mod service;

pub use error::DatabaseError;
pub use memory::MemoryStore;
pub use service::{BuildingUpdate, UrbanService};

use libsql::Builder;

/// Handle to a local libSQL database holding the entity hierarchy.
pub struct UrbisDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl UrbisDb {
    /// Open a local database at `path` (`":memory:"` for an ephemeral one).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let urbis_db = Self { db, conn };
        urbis_db.run_migrations().await?;
        tracing::debug!(path, "opened entity store");
        Ok(urbis_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> UrbisDb {
        UrbisDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                ["entities"],
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn kind_column_is_constrained() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO entities (id, kind, name, attributes) VALUES (?1, ?2, ?3, ?4)",
                ["dst-00000001", "district", "Old Town", "{}"],
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn opens_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urbis.db");
        let path = path.to_str().unwrap();
        UrbisDb::open_local(path).await.unwrap();
        assert!(std::path::Path::new(path).exists());
    }
}
