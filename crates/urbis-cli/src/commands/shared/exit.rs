use urbis_core::errors::CoreError;
use urbis_pipeline::PipelineError;

/// Map an error chain to the process exit code.
///
/// 2 validation, 3 not found, 4 compute or extraction, 5 integrity, 1 anything else.
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<PipelineError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::Validation(_) => 2,
                CoreError::NotFound { .. } => 3,
                CoreError::Integrity(_) | CoreError::InvalidTransition { .. } => 5,
                CoreError::Storage(_) | CoreError::Other(_) => 1,
            };
        }
    }
    1
}
