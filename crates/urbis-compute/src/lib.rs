//! # urbis-compute
//!
//! Client side of the external geometry engine.
//!
//! - [`ComputeEngine`]: the seam the pipeline calls through
//! - [`HttpComputeEngine`]: adapter for a Grasshopper compute server
//! - [`assemble_request`]: building inputs → request trees
//! - [`extract_artifact`]: locate the geometry file in a response

pub mod engine;
pub mod extract;
pub mod model;
pub mod request;

mod error;
mod http;

pub use engine::{ComputeEngine, HttpComputeEngine};
pub use error::ComputeError;
pub use extract::{Extracted, extract_artifact};
pub use model::{ComputeRequest, ComputeResponse, DataItem, DataTree};
pub use request::assemble_request;
