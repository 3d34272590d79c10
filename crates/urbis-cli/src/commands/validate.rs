use urbis_geometry::{validate, validate_for_building_footprint};
use urbis_pipeline::PipelineError;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::commands::shared::input::read_json_file;
use crate::output::output;

/// Handle `urb validate`. Prints the report; an invalid file also fails the
/// command so the exit code reflects it.
pub fn handle(args: &ValidateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let value = read_json_file(&args.file)?;
    let report = if args.footprint {
        validate_for_building_footprint(&value)
    } else {
        validate(&value)
    };
    output(&report, flags.format)?;
    if report.ok {
        Ok(())
    } else {
        Err(PipelineError::Validation {
            errors: report.errors,
        }
        .into())
    }
}
