use clap::Subcommand;

/// Override commands.
#[derive(Clone, Debug, Subcommand)]
pub enum OverrideCommands {
    /// Set a local override. VALUE is parsed as JSON, falling back to a string.
    Set {
        id: String,
        key: String,
        value: String,
        /// Level of detail for the follow-up geometry refresh.
        #[arg(long)]
        lod: Option<String>,
    },
    /// Remove a local override so the value is inherited again.
    Clear {
        id: String,
        key: String,
        #[arg(long)]
        lod: Option<String>,
    },
}
