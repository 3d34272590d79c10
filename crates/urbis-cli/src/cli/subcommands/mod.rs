pub mod artifact;
pub mod entity;
pub mod geometry;
pub mod overrides;

pub use artifact::ArtifactCommands;
pub use entity::{BuildingCommands, ProjectCommands, SiteCommands, ZoneCommands};
pub use geometry::GeometryCommands;
pub use overrides::OverrideCommands;
