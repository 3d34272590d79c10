pub mod artifact;
pub mod dispatch;
pub mod entity;
pub mod geometry;
pub mod overrides;
pub mod shared;
pub mod tree;
pub mod validate;
