#![forbid(unsafe_code)]

//! SVG output for packed-circle hierarchies.
//!
//! The renderer only consumes a [`PackedHierarchy`] and an optional [`RelatedIds`] set; it does
//! no layout of its own. [`render_records_svg`] runs the whole pipeline for callers that start
//! from raw records.

pub mod svg;

pub use svg::{SvgRenderOptions, depth_color, render_svg};

use circlepack_core::{Config, HierarchyOptions, Record, RelatedIds, Selection};
use circlepack_layout::{PackOptions, PackedHierarchy};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] circlepack_core::Error),
    #[error(transparent)]
    Layout(#[from] circlepack_layout::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Builds, lays out and renders `records` in one go.
///
/// A non-empty `selection` is resolved against the same records and highlighted.
pub fn render_records_svg<'a>(
    records: &[Record],
    config: &Config,
    selection: impl Into<Selection<'a>>,
    options: &SvgRenderOptions,
) -> Result<String> {
    let packed = pack_records(records, config)?;
    let selection = selection.into();
    let mut options = options.clone();
    if !selection.is_empty() {
        options.highlight = Some(circlepack_core::resolve(
            selection,
            records,
            &config.delimiter,
        ));
    }
    Ok(render_svg(&packed, &options))
}

/// Records to positioned tree with the box, padding and delimiter from `config`.
pub fn pack_records(records: &[Record], config: &Config) -> Result<PackedHierarchy> {
    let hierarchy = circlepack_core::build_with(
        records,
        &HierarchyOptions {
            delimiter: config.delimiter.clone(),
            ..Default::default()
        },
    )?;
    Ok(circlepack_layout::layout(
        &hierarchy,
        &PackOptions::from_config(config),
    )?)
}

/// Renders `packed` with `related` highlighted.
pub fn render_highlighted_svg(
    packed: &PackedHierarchy,
    related: RelatedIds,
    options: &SvgRenderOptions,
) -> String {
    render_svg(packed, &options.clone().with_highlight(related))
}
