mod color;
mod util;

pub use color::depth_color;

use circlepack_core::RelatedIds;
use circlepack_layout::{PackedHierarchy, PackedNode};
use std::fmt::Write as _;
use util::{escape_xml, escape_xml_into, fmt, fmt_into};

pub const DEFAULT_CLASS_NAME: &str = "lgv-packed-circles";
pub const NODE_CLASS: &str = "lgv-node";
pub const LABEL_CLASS: &str = "lgv-label";
pub const LEAF_FILL: &str = "white";
pub const ACTIVE_OPACITY: f64 = 1.0;
pub const INACTIVE_OPACITY: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Class of the root `<svg>` element.
    pub class_name: String,
    /// Related ids to emphasize. Nodes outside the set are dimmed; `None` renders everything
    /// at full opacity without state classes.
    pub highlight: Option<RelatedIds>,
    /// Adds `style="cursor: pointer"` to every circle.
    pub pointer_cursor: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            highlight: None,
            pointer_cursor: true,
        }
    }
}

impl SvgRenderOptions {
    pub fn with_highlight(mut self, related: RelatedIds) -> Self {
        self.highlight = Some(related);
        self
    }
}

/// Renders a packed hierarchy as a standalone SVG document.
///
/// All circles come first, in pre-order so parents paint below their children, followed by one
/// label per node.
pub fn render_svg(packed: &PackedHierarchy, options: &SvgRenderOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" class="{}">"#,
        fmt(packed.width),
        fmt(packed.height),
        escape_xml(&options.class_name)
    );
    out.push('\n');

    for node in packed.descendants() {
        render_circle(&mut out, node, options);
    }
    for node in packed.descendants() {
        render_label(&mut out, node, options);
    }

    out.push_str("</svg>\n");
    tracing::debug!(
        nodes = packed.len(),
        highlighted = options.highlight.as_ref().map(RelatedIds::len),
        "rendered svg"
    );
    out
}

fn render_circle(out: &mut String, node: &PackedNode, options: &SvgRenderOptions) {
    out.push_str("<circle class=\"");
    push_class(out, NODE_CLASS, node, options);
    out.push_str("\" id=\"");
    escape_xml_into(out, &node.label);
    out.push_str("\" data-id=\"");
    escape_xml_into(out, &node.id);
    out.push_str("\" cx=\"");
    fmt_into(out, node.x);
    out.push_str("\" cy=\"");
    fmt_into(out, node.y);
    out.push_str("\" r=\"");
    fmt_into(out, node.r);
    out.push_str("\" fill=\"");
    if node.is_leaf() {
        out.push_str(LEAF_FILL);
    } else {
        out.push_str(&depth_color(node.depth));
    }
    out.push('"');
    push_opacity(out, node, options);
    if options.pointer_cursor {
        out.push_str(r#" style="cursor: pointer""#);
    }
    out.push_str("/>\n");
}

fn render_label(out: &mut String, node: &PackedNode, options: &SvgRenderOptions) {
    out.push_str("<text class=\"");
    push_class(out, LABEL_CLASS, node, options);
    out.push_str("\" x=\"");
    fmt_into(out, node.x);
    out.push_str("\" y=\"");
    fmt_into(out, node.y);
    out.push('"');
    push_opacity(out, node, options);
    out.push('>');
    escape_xml_into(out, &node.label);
    out.push_str("</text>\n");
}

fn push_class(out: &mut String, base: &str, node: &PackedNode, options: &SvgRenderOptions) {
    out.push_str(base);
    if let Some(related) = &options.highlight {
        out.push_str(if related.is_active(&node.id) {
            " active"
        } else {
            " inactive"
        });
    }
}

fn push_opacity(out: &mut String, node: &PackedNode, options: &SvgRenderOptions) {
    let Some(related) = &options.highlight else {
        return;
    };
    let opacity = if related.is_active(&node.id) {
        ACTIVE_OPACITY
    } else {
        INACTIVE_OPACITY
    };
    out.push_str(" opacity=\"");
    fmt_into(out, opacity);
    out.push('"');
}
