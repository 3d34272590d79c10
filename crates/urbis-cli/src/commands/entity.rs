use serde_json::{Value, json};
use urbis_core::entities::Entity;
use urbis_core::enums::{EntityKind, LevelOfDetail};
use urbis_core::responses::{DeleteResponse, MutationResponse};
use urbis_geometry::{validate, validate_for_building_footprint};
use urbis_pipeline::PipelineError;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::cli::subcommands::{BuildingCommands, ProjectCommands, SiteCommands, ZoneCommands};
use crate::commands::geometry::resolve_lod;
use crate::commands::shared::input::read_json_file;
use crate::commands::shared::parse::{parse_enum, parse_floor_range, parse_overrides};
use crate::context::AppContext;
use crate::output::output;

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Handle `urb project`.
pub async fn handle_project(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let ProjectCommands::Create {
        name,
        description,
        set,
    } = action;
    let project = ctx
        .service
        .create_project(name, description, parse_overrides(set)?)
        .await?;
    output(&project, flags.format)
}

/// Handle `urb site`.
pub async fn handle_site(
    action: &SiteCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let SiteCommands::Create {
        project,
        name,
        boundary,
        set,
    } = action;
    let boundary = match boundary {
        Some(path) => {
            let value = read_json_file(path)?;
            let report = validate(&value);
            if !report.ok {
                return Err(PipelineError::Validation {
                    errors: report.errors,
                }
                .into());
            }
            Some(value)
        }
        None => None,
    };
    let site = ctx
        .service
        .create_site(project, name, boundary, parse_overrides(set)?)
        .await?;
    output(&site, flags.format)
}

/// Handle `urb building`. Footprints are validated before anything is
/// stored; geometry computes after a mutation are best-effort.
pub async fn handle_building(
    action: &BuildingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        BuildingCommands::Create {
            site,
            name,
            footprint,
            set,
            no_compute,
        } => {
            let footprint = read_footprint(footprint)?;
            let building = ctx
                .service
                .create_building(site, name, footprint, parse_overrides(set)?)
                .await?;
            let lod = resolve_lod(ctx, None)?;
            let response = refresh_building(building, !*no_compute, lod, ctx).await?;
            output(&response, flags.format)
        }
        BuildingCommands::Update {
            id,
            name,
            footprint,
            lod,
            no_compute,
        } => {
            let lod = resolve_lod(ctx, lod.as_deref())?;
            let footprint = footprint.as_deref().map(read_footprint).transpose()?;
            let update = ctx
                .service
                .update_building(id, name.as_deref(), footprint)
                .await?;
            let compute = update.footprint_changed && !*no_compute;
            let response = refresh_building(update.entity, compute, lod, ctx).await?;
            output(&response, flags.format)
        }
    }
}

fn read_footprint(path: &str) -> anyhow::Result<Value> {
    let footprint = read_json_file(path)?;
    let report = validate_for_building_footprint(&footprint);
    if !report.ok {
        return Err(PipelineError::Validation {
            errors: report.errors,
        }
        .into());
    }
    Ok(footprint)
}

async fn refresh_building(
    building: Entity,
    compute: bool,
    lod: LevelOfDetail,
    ctx: &AppContext,
) -> anyhow::Result<MutationResponse> {
    if !compute {
        return Ok(MutationResponse::from(building));
    }
    let geometry = ctx
        .pipeline
        .refresh(std::slice::from_ref(&building), lod)
        .await;
    let entity = ctx.service.store().fetch(&building.id).await?;
    Ok(MutationResponse { entity, geometry })
}

/// Handle `urb zone`.
pub async fn handle_zone(
    action: &ZoneCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let ZoneCommands::Create {
        building,
        name,
        floors,
        set,
    } = action;
    let floor_range = floors
        .as_deref()
        .map(parse_floor_range)
        .transpose()?
        .unwrap_or_default();
    let zone = ctx
        .service
        .create_zone(building, name, floor_range, parse_overrides(set)?)
        .await?;
    output(&zone, flags.format)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Handle `urb get`.
pub async fn get(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let detail = ctx.service.detail(id).await?;
    output(&detail, flags.format)
}

/// Handle `urb effective`.
pub async fn effective(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let detail = ctx.service.detail(id).await?;
    output(
        &json!({
            "id": detail.entity.id,
            "effective_properties": detail.effective_properties,
        }),
        flags.format,
    )
}

/// Handle `urb resolve`.
pub async fn resolve(
    id: &str,
    key: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resolved = ctx.service.resolve(id, key).await?;
    output(&resolved, flags.format)
}

/// Handle `urb list`.
pub async fn list(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let kind = args
        .kind
        .as_deref()
        .map(|value| parse_enum::<EntityKind>(value, "kind"))
        .transpose()?;
    let entities = ctx.service.store().list(kind).await?;
    output(&entities, flags.format)
}

/// Handle `urb delete`.
pub async fn delete(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let deleted = ctx.service.delete(id).await?;
    output(
        &DeleteResponse {
            id: id.to_string(),
            deleted,
        },
        flags.format,
    )
}
