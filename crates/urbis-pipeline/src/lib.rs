//! # urbis-pipeline
//!
//! Keeps each building's cached geometry in step with its inputs.
//!
//! [`GeometryPipeline::ensure_geometry`] validates the footprint, resolves the
//! effective properties, fingerprints the geometry-affecting inputs and only
//! calls the compute engine when the stored record does not match. Calls for
//! the same building are serialized, so concurrent requests compute once.

mod error;
mod pipeline;

pub use error::PipelineError;
pub use pipeline::{GeometryOutcome, GeometryPipeline, PipelineConfig};
