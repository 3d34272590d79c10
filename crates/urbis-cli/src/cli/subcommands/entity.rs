use clap::Subcommand;

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Override as `key=value`; the value is parsed as JSON when possible.
        #[arg(long)]
        set: Vec<String>,
    },
}

/// Site commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SiteCommands {
    /// Create a site under a project.
    Create {
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
        /// GeoJSON file with the site boundary.
        #[arg(long)]
        boundary: Option<String>,
        #[arg(long)]
        set: Vec<String>,
    },
}

/// Building commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BuildingCommands {
    /// Create a building under a site and compute its geometry.
    Create {
        #[arg(long)]
        site: String,
        #[arg(long)]
        name: String,
        /// GeoJSON file with the footprint.
        #[arg(long)]
        footprint: String,
        #[arg(long)]
        set: Vec<String>,
        /// Skip the initial geometry compute.
        #[arg(long)]
        no_compute: bool,
    },
    /// Rename a building or replace its footprint. A new footprint triggers
    /// a geometry refresh.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// GeoJSON file with the new footprint.
        #[arg(long)]
        footprint: Option<String>,
        /// Level of detail for the follow-up geometry refresh.
        #[arg(long)]
        lod: Option<String>,
        #[arg(long)]
        no_compute: bool,
    },
}

/// Zone commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ZoneCommands {
    /// Create a zone under a building.
    Create {
        #[arg(long)]
        building: String,
        #[arg(long)]
        name: String,
        /// Floor range as `A-B` or a single floor.
        #[arg(long)]
        floors: Option<String>,
        #[arg(long)]
        set: Vec<String>,
    },
}
