use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use urbis_compute::HttpComputeEngine;
use urbis_config::UrbisConfig;
use urbis_core::store::EntityStore;
use urbis_db::{MemoryStore, UrbanService, UrbisDb};
use urbis_pipeline::{GeometryPipeline, PipelineConfig};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: UrbanService,
    pub pipeline: GeometryPipeline,
    pub config: UrbisConfig,
}

impl AppContext {
    /// Open the entity store and wire the geometry pipeline.
    pub async fn init(project_root: &Path, config: UrbisConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn EntityStore> = match config.store.resolve_path(project_root) {
            None => {
                tracing::debug!("using in-memory entity store");
                Arc::new(MemoryStore::new())
            }
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create store directory {}", parent.display())
                    })?;
                }
                let db = UrbisDb::open_local(&path.to_string_lossy())
                    .await
                    .with_context(|| format!("failed to open entity store {}", path.display()))?;
                Arc::new(db)
            }
        };

        let engine = HttpComputeEngine::new(&config.compute)
            .context("failed to initialize compute engine client")?;
        let pipeline = GeometryPipeline::new(
            Arc::clone(&store),
            Arc::new(engine),
            PipelineConfig::from(&config.compute),
        );

        Ok(Self {
            service: UrbanService::new(store),
            pipeline,
            config,
        })
    }
}
