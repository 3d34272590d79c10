use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::entity::handle_project(&action, ctx, flags).await,
        Commands::Site { action } => commands::entity::handle_site(&action, ctx, flags).await,
        Commands::Building { action } => commands::entity::handle_building(&action, ctx, flags).await,
        Commands::Zone { action } => commands::entity::handle_zone(&action, ctx, flags).await,
        Commands::Get { id } => commands::entity::get(&id, ctx, flags).await,
        Commands::Delete { id } => commands::entity::delete(&id, ctx, flags).await,
        Commands::List(args) => commands::entity::list(&args, ctx, flags).await,
        Commands::Resolve { id, key } => commands::entity::resolve(&id, &key, ctx, flags).await,
        Commands::Effective { id } => commands::entity::effective(&id, ctx, flags).await,
        Commands::Override { action } => commands::overrides::handle(&action, ctx, flags).await,
        Commands::Geometry { action } => commands::geometry::handle(&action, ctx, flags).await,
        Commands::Tree { project_id } => commands::tree::handle(&project_id, ctx, flags).await,
        Commands::Artifact { action } => commands::artifact::handle(&action, ctx, flags).await,
        Commands::Validate(_) => unreachable!("validate is pre-dispatched in main"),
    }
}
