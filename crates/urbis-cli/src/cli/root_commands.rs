use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    ArtifactCommands, BuildingCommands, GeometryCommands, OverrideCommands, ProjectCommands,
    SiteCommands, ZoneCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Projects (hierarchy roots).
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Sites within a project.
    Site {
        #[command(subcommand)]
        action: SiteCommands,
    },
    /// Buildings within a site.
    Building {
        #[command(subcommand)]
        action: BuildingCommands,
    },
    /// Zones within a building.
    Zone {
        #[command(subcommand)]
        action: ZoneCommands,
    },
    /// Show an entity with its effective properties.
    Get { id: String },
    /// Delete an entity (children are not deleted).
    Delete { id: String },
    /// List entities.
    List(ListArgs),
    /// Local property overrides.
    Override {
        #[command(subcommand)]
        action: OverrideCommands,
    },
    /// Resolve one property through the hierarchy.
    Resolve { id: String, key: String },
    /// Show the effective property set of an entity.
    Effective { id: String },
    /// Building geometry cache.
    Geometry {
        #[command(subcommand)]
        action: GeometryCommands,
    },
    /// Nested project → site → building view.
    Tree { project_id: String },
    /// Validate a GeoJSON file.
    Validate(ValidateArgs),
    /// Geometry artifacts.
    Artifact {
        #[command(subcommand)]
        action: ArtifactCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Only entities of this kind (project, site, building, zone).
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// GeoJSON file to check.
    pub file: String,
    /// Also require every geometry to be a Polygon or MultiPolygon.
    #[arg(long)]
    pub footprint: bool,
}
