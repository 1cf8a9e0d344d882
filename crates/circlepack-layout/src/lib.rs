#![forbid(unsafe_code)]

//! Headless nested circle-packing layout.
//!
//! `circlepack-layout` turns a [`circlepack_core::Hierarchy`] into positioned circles: siblings
//! never overlap (up to the configured padding) and every child lies inside its parent.
//! Output is deterministic for identical inputs.

pub mod circle;
pub mod error;
pub mod pack;
pub mod siblings;

pub use circle::{Circle, enclose};
pub use error::{Error, Result};
pub use pack::{PackOptions, PackedHierarchy, PackedNode, layout};
pub use siblings::pack_siblings;

use circlepack_core::{Config, Hierarchy};

/// Lays out `hierarchy` with the box and padding from `config`.
pub fn layout_with_config(hierarchy: &Hierarchy, config: &Config) -> Result<PackedHierarchy> {
    layout(hierarchy, &PackOptions::from_config(config))
}
