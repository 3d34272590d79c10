//! General application configuration.

use serde::{Deserialize, Serialize};
use urbis_core::enums::LevelOfDetail;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Level of detail used when a geometry command does not pass `--lod`.
    #[serde(default)]
    pub default_lod: LevelOfDetail,
}
