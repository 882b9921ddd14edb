//! Locator registry - symbolic element keys resolved to concrete selectors
//!
//! This crate decouples the names used by scenario steps from the selector
//! strings used to find elements:
//! - Declarative sources (JSON or YAML arrays of `key`/`type`/`value` records)
//! - Ordered source discovery (explicit path, bundled resource, working dir)
//! - Immutable registry shared by reference after construction
//! - Resolution into an `id` / `css` / `xpath` selector descriptor

pub mod errors;
pub mod registry;
pub mod source;
pub mod types;

pub use errors::*;
pub use registry::*;
pub use source::*;
pub use types::*;
