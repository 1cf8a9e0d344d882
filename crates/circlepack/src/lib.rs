#![forbid(unsafe_code)]

//! `circlepack` turns flat, delimiter-joined path records into a weighted hierarchy, packs it as
//! nested circles and renders the result as SVG, all without a browser.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`circlepack::render`)

pub use circlepack_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use circlepack_layout::{Circle, PackOptions, PackedHierarchy, PackedNode};
    pub use circlepack_render::svg::{
        ACTIVE_OPACITY, DEFAULT_CLASS_NAME, INACTIVE_OPACITY, LABEL_CLASS, LEAF_FILL, NODE_CLASS,
    };
    pub use circlepack_render::{SvgRenderOptions, depth_color, render_svg};

    use circlepack_core::{Config, Hierarchy, HierarchyOptions, Record, RelatedIds, Selection};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Build(#[from] circlepack_core::Error),
        #[error(transparent)]
        Layout(#[from] circlepack_layout::Error),
    }

    impl From<circlepack_render::Error> for HeadlessError {
        fn from(err: circlepack_render::Error) -> Self {
            match err {
                circlepack_render::Error::Core(e) => Self::Build(e),
                circlepack_render::Error::Layout(e) => Self::Layout(e),
            }
        }
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    pub fn layout_records(records: &[Record], config: &Config) -> Result<PackedHierarchy> {
        Ok(circlepack_render::pack_records(records, config)?)
    }

    pub fn render_records_svg<'a>(
        records: &[Record],
        config: &Config,
        selection: impl Into<Selection<'a>>,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        Ok(circlepack_render::render_records_svg(
            records,
            config,
            selection,
            svg_options,
        )?)
    }

    /// Bundles a [`Config`] and SVG options so UI integrations can go from records to SVG with
    /// a single call per frame.
    #[derive(Debug, Clone, Default)]
    pub struct HeadlessRenderer {
        pub config: Config,
        pub synthetic_root: bool,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, config: Config) -> Self {
            self.config = config;
            self
        }

        pub fn with_synthetic_root(mut self, synthetic_root: bool) -> Self {
            self.synthetic_root = synthetic_root;
            self
        }

        pub fn with_svg_options(mut self, svg: SvgRenderOptions) -> Self {
            self.svg = svg;
            self
        }

        pub fn build(&self, records: &[Record]) -> Result<Hierarchy> {
            Ok(circlepack_core::build_with(
                records,
                &HierarchyOptions {
                    delimiter: self.config.delimiter.clone(),
                    synthetic_root: self.synthetic_root,
                },
            )?)
        }

        pub fn layout(&self, records: &[Record]) -> Result<PackedHierarchy> {
            let hierarchy = self.build(records)?;
            Ok(circlepack_layout::layout_with_config(
                &hierarchy,
                &self.config,
            )?)
        }

        pub fn related<'a>(
            &self,
            selection: impl Into<Selection<'a>>,
            records: &[Record],
        ) -> RelatedIds {
            circlepack_core::resolve(selection, records, &self.config.delimiter)
        }

        pub fn render_svg(&self, records: &[Record]) -> Result<String> {
            let packed = self.layout(records)?;
            Ok(render_svg(&packed, &self.svg))
        }

        /// Renders with every node related to `selection` emphasized and the rest dimmed.
        pub fn render_svg_highlighted<'a>(
            &self,
            records: &[Record],
            selection: impl Into<Selection<'a>>,
        ) -> Result<String> {
            let packed = self.layout(records)?;
            let related = self.related(selection, records);
            Ok(circlepack_render::render_highlighted_svg(
                &packed, related, &self.svg,
            ))
        }
    }
}
