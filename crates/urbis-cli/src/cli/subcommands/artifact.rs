use clap::{ArgGroup, Subcommand};

/// Artifact commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ArtifactCommands {
    /// Show the container header, chunks and JSON payload of an artifact.
    #[command(group(ArgGroup::new("source").required(true).args(["building", "file"])))]
    Inspect {
        /// Inspect the cached artifact of this building.
        #[arg(long)]
        building: Option<String>,
        /// Inspect a file holding a container or its base64 form.
        #[arg(long)]
        file: Option<String>,
    },
}
