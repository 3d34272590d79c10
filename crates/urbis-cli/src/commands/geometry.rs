use serde_json::json;
use urbis_core::enums::LevelOfDetail;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GeometryCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// `--lod` if given, otherwise `general.default_lod`.
pub fn resolve_lod(ctx: &AppContext, raw: Option<&str>) -> anyhow::Result<LevelOfDetail> {
    raw.map_or(Ok(ctx.config.general.default_lod), |value| {
        parse_enum(value, "lod")
    })
}

/// Handle `urb geometry`.
pub async fn handle(
    action: &GeometryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GeometryCommands::Ensure { id, lod, force } => {
            let lod = resolve_lod(ctx, lod.as_deref())?;
            let outcome = ctx.pipeline.ensure_geometry(id, lod, *force).await?;
            output(
                &json!({
                    "building": outcome.building,
                    "source": outcome.source,
                }),
                flags.format,
            )
        }
        GeometryCommands::Status { id, lod } => {
            let lod = resolve_lod(ctx, lod.as_deref())?;
            let status = ctx.pipeline.cache_status(id, lod).await?;
            output(&status, flags.format)
        }
        GeometryCommands::Invalidate { id } => {
            let cleared = ctx.pipeline.invalidate(id).await?;
            output(&json!({ "building_id": id, "cleared": cleared }), flags.format)
        }
        GeometryCommands::Health => {
            let healthy = match ctx.pipeline.health().await {
                Ok(healthy) => healthy,
                Err(error) => {
                    tracing::warn!(%error, "compute health check failed");
                    false
                }
            };
            output(
                &json!({
                    "base_url": ctx.config.compute.normalized_base_url(),
                    "offline": ctx.pipeline.config().offline,
                    "healthy": healthy,
                }),
                flags.format,
            )
        }
    }
}
