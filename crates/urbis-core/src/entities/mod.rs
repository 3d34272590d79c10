//! Entity structs for the Urbis hierarchy.
//!
//! Every node shares the [`Entity`] envelope (id, name, parent link, ordered
//! children, local overrides). Kind-specific data lives in [`EntityAttributes`],
//! which serializes flattened under a `kind` tag.

mod building;
mod entity;

pub use building::{BuildingAttributes, CachedGeometry, GeometryCache};
pub use entity::{Entity, EntityAttributes, FloorRange};
