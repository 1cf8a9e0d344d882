#![forbid(unsafe_code)]

//! Headless core for circle-packing diagrams of path hierarchies.
//!
//! - [`hierarchy`]: flat `{id, value}` path records to a rooted tree
//! - [`related`]: ids to highlight for a selection of labels
//! - [`config`]: delimiter and layout box settings with documented defaults
//!
//! Everything here is a pure function over its inputs; geometry lives in `circlepack-layout`.

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod record;
pub mod related;

pub use config::Config;
pub use error::{Error, Result};
pub use hierarchy::{Hierarchy, HierarchyNode, HierarchyOptions, build, build_with};
pub use record::{Record, label_of, parent_id, records_from_json_str};
pub use related::{RelatedIds, Selection, resolve, resolve_label};
