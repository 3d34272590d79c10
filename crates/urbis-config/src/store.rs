//! Entity store configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Path that selects the in-memory store.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".urbis/urbis.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file, relative to the project root, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    /// Resolve the database path against `project_root`. `None` for `:memory:`.
    #[must_use]
    pub fn resolve_path(&self, project_root: &Path) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }
        let path = PathBuf::from(&self.path);
        Some(if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        })
    }
}
