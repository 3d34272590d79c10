//! # urbis-geometry
//!
//! Pure geometry-side building blocks of the compute pipeline:
//!
//! - [`validate`]: recursive GeoJSON structure and coordinate-range checks,
//!   plus the stricter footprint check that gates compute requests
//! - [`artifact`]: base64 transport form and the binary glTF container
//!   (header, JSON chunk) used for computed geometry
//! - [`fingerprint`]: the deterministic cache key over a building's
//!   geometry-affecting inputs
//!
//! Nothing here performs I/O.

pub mod artifact;
pub mod fingerprint;
pub mod validate;

pub use artifact::ArtifactError;
pub use fingerprint::fingerprint;
pub use validate::{ValidationReport, validate, validate_for_building_footprint};
