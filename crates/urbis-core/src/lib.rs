//! # urbis-core
//!
//! Core types, property resolution, and the store abstraction for Urbis.
//!
//! This crate provides the foundational types shared across all Urbis crates:
//! - Entity structs for the project → site → building → zone hierarchy
//! - Kind ordering, level-of-detail, and cache state enums
//! - The fixed effective property set with its system-wide defaults
//! - Override/inheritance resolution over an ancestry chain
//! - The `EntityStore` trait consumed by the pipeline and implemented by `urbis-db`
//! - ID generation and cross-cutting error types
//! - Response shapes for the project tree and entity detail views

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod properties;
pub mod resolve;
pub mod responses;
pub mod store;
