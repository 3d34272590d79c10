//! # urbis-config
//!
//! Layered configuration loading for Urbis using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`URBIS_*` prefix, `__` as separator)
//! 2. Project-level `.urbis/config.toml`
//! 3. User-level `~/.config/urbis/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `URBIS_COMPUTE__BASE_URL` -> `compute.base_url`,
//! `URBIS_STORE__PATH` -> `store.path`, etc. The `__` (double underscore)
//! separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use urbis_config::UrbisConfig;
//!
//! let config = UrbisConfig::load_with_dotenv().expect("config");
//!
//! if config.compute.is_configured() {
//!     println!("Compute server: {}", config.compute.base_url);
//! }
//! ```

mod compute;
mod error;
mod general;
mod store;

pub use compute::ComputeConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::{IN_MEMORY, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local state (config and database).
pub const PROJECT_DIR: &str = ".urbis";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UrbisConfig {
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl UrbisConfig {
    /// Load configuration for the current directory from all sources.
    ///
    /// Does NOT call `dotenvy`; use [`load_with_dotenv`](Self::load_with_dotenv)
    /// for `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with `project_root/.urbis/config.toml` as the
    /// project layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(project_root).extract()?;
        config.compute.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory, then [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `.env` is malformed, a source fails to
    /// parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv(Path::new("."))?;
        Self::load()
    }

    /// Load `project_root/.env` into the process environment. Variables that
    /// are already set win. Returns the file's path when one was loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] if the file exists but cannot be read
    /// or parsed. A missing file is not an error.
    pub fn load_dotenv(project_root: &Path) -> Result<Option<PathBuf>, ConfigError> {
        let path = project_root.join(".env");
        match dotenvy::from_path(&path) {
            Ok(()) => Ok(Some(path)),
            Err(error) if error.not_found() => Ok(None),
            Err(source) => Err(ConfigError::Dotenv { path, source }),
        }
    }

    /// Build the figment provider chain for the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = Self::project_config_path(project_root);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("URBIS_").split("__"))
    }

    /// `project_root/.urbis/config.toml`.
    #[must_use]
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join("config.toml")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("urbis").join("config.toml"))
    }
}
