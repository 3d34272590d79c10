use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `urb tree`.
pub async fn handle(project_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let tree = ctx.service.project_tree(project_id).await?;
    output(&tree, flags.format)
}
