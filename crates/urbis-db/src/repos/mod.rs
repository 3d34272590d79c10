//! Repository modules implementing storage operations on `UrbisDb`.
//!
//! Each module adds methods to `UrbisDb` via `impl UrbisDb` blocks and
//! implements the matching `urbis-core` store trait.

pub mod entity;
