use clap::Subcommand;

/// Geometry cache commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GeometryCommands {
    /// Compute geometry unless a valid cached copy exists.
    Ensure {
        id: String,
        /// low, medium or high (defaults to `general.default_lod`).
        #[arg(long)]
        lod: Option<String>,
        /// Recompute even when the cache is valid.
        #[arg(long)]
        force: bool,
    },
    /// Report cache validity without computing.
    Status {
        id: String,
        #[arg(long)]
        lod: Option<String>,
    },
    /// Drop the cached geometry.
    Invalidate { id: String },
    /// Check that the compute engine is reachable.
    Health,
}
