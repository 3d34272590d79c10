use urbis_core::enums::LevelOfDetail;
use urbis_core::responses::MutationResponse;
use urbis_db::service::OverrideChange;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::OverrideCommands;
use crate::commands::geometry::resolve_lod;
use crate::commands::shared::parse::parse_override_value;
use crate::context::AppContext;
use crate::output::output;

/// Handle `urb override`. `--lod` is checked before anything is stored.
pub async fn handle(
    action: &OverrideCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (change, lod) = match action {
        OverrideCommands::Set { id, key, value, lod } => {
            let lod = resolve_lod(ctx, lod.as_deref())?;
            let change = ctx
                .service
                .set_override(id, key, parse_override_value(value))
                .await?;
            (change, lod)
        }
        OverrideCommands::Clear { id, key, lod } => {
            let lod = resolve_lod(ctx, lod.as_deref())?;
            (ctx.service.clear_override(id, key).await?, lod)
        }
    };
    let response = refresh_after(change, lod, ctx).await?;
    output(&response, flags.format)
}

/// Recompute geometry for every building affected by a geometry-relevant
/// change. Refresh failures become warnings; the override itself is kept.
async fn refresh_after(
    change: OverrideChange,
    lod: LevelOfDetail,
    ctx: &AppContext,
) -> anyhow::Result<MutationResponse> {
    if !change.needs_geometry_refresh() {
        return Ok(MutationResponse::from(change.entity));
    }
    let buildings = match ctx.service.affected_buildings(&change.entity).await {
        Ok(buildings) => buildings,
        Err(error) => {
            tracing::warn!(id = %change.entity.id, "skipping geometry refresh: {error}");
            return Ok(MutationResponse::from(change.entity));
        }
    };
    let geometry = ctx.pipeline.refresh(&buildings, lod).await;
    for refresh in &geometry {
        if let Some(warning) = &refresh.warning {
            tracing::warn!(building = %refresh.building_id, "geometry refresh failed: {warning}");
        }
    }

    // A building's own record changed during the refresh.
    let entity = ctx.service.store().fetch(&change.entity.id).await?;
    Ok(MutationResponse { entity, geometry })
}
