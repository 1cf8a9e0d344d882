//! Nested circle-packing layout of a whole hierarchy.
//!
//! Radii are computed bottom-up in unit space: a leaf gets `sqrt(value)`, a branch the enclosing
//! radius of its packed children plus half the padding. A first pass without padding fixes the
//! unit-to-pixel scale; the padding is converted into unit space with it and the tree re-packed.
//! A few secant refinements follow until the padding, once scaled to fill
//! `min(width, height) / 2`, matches the requested one. Leaf radii stay proportional to
//! `sqrt(value)` throughout; only the padding shrinks when it cannot fit.

use crate::circle::Circle;
use crate::siblings::pack_siblings;
use crate::{Error, Result};
use circlepack_core::config::{DEFAULT_HEIGHT, DEFAULT_PADDING_CIRCLES, DEFAULT_WIDTH};
use circlepack_core::{Config, Hierarchy};
use serde::{Deserialize, Serialize};

const MAX_PADDING_PASSES: usize = 8;
const FIT_REL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackOptions {
    pub width: f64,
    pub height: f64,
    /// Minimum gap between sibling rims, and between a child and its parent's rim.
    pub padding: f64,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            padding: DEFAULT_PADDING_CIRCLES,
        }
    }
}

impl PackOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.width,
            height: config.height,
            padding: config.padding_circles,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidDimension { name, value });
            }
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(Error::InvalidPadding {
                value: self.padding,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedNode {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl PackedNode {
    pub fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.r)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Positioned tree. Nodes keep the hierarchy's pre-order, so index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedHierarchy {
    pub width: f64,
    pub height: f64,
    /// Padding actually realized between circles. Equals the requested padding unless it did
    /// not fit the box, in which case it was shrunk and the leaves kept their proportions.
    pub padding: f64,
    pub nodes: Vec<PackedNode>,
}

impl PackedHierarchy {
    pub fn root(&self) -> &PackedNode {
        &self.nodes[0]
    }

    pub fn get(&self, index: usize) -> Option<&PackedNode> {
        self.nodes.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&PackedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &PackedNode> + '_ {
        self.nodes
            .get(index)
            .into_iter()
            .flat_map(|n| n.children.iter().map(|&c| &self.nodes[c]))
    }

    /// All nodes, root first, parents before children.
    pub fn descendants(&self) -> impl Iterator<Item = &PackedNode> + '_ {
        self.nodes.iter()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &PackedNode> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn layout(hierarchy: &Hierarchy, options: &PackOptions) -> Result<PackedHierarchy> {
    options.validate()?;

    let target = options.width.min(options.height) / 2.0;
    let center = (options.width / 2.0, options.height / 2.0);
    let padding = options.padding;

    let fit = if hierarchy.root().is_leaf() {
        Fit {
            local: vec![Circle::new(0.0, 0.0, target)],
            scale: 1.0,
            padding,
        }
    } else {
        fit_padding(hierarchy, padding, target)
    };
    let Fit {
        local,
        scale: k,
        padding: realized_padding,
    } = fit;

    let nodes = hierarchy.nodes();
    let mut packed: Vec<PackedNode> = Vec::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        let (x, y) = match node.parent {
            None => center,
            Some(p) => (
                packed[p].x + local[idx].x * k,
                packed[p].y + local[idx].y * k,
            ),
        };
        let r = if node.parent.is_none() {
            target
        } else {
            local[idx].r * k
        };
        packed.push(PackedNode {
            id: node.id.clone(),
            label: node.label.clone(),
            value: node.value,
            depth: node.depth,
            parent: node.parent,
            children: node.children.clone(),
            x,
            y,
            r,
        });
    }

    if realized_padding < padding {
        tracing::debug!(
            requested = padding,
            realized = realized_padding,
            "padding does not fit the layout box; scaled down"
        );
    }
    tracing::debug!(
        nodes = packed.len(),
        width = options.width,
        height = options.height,
        "packed hierarchy"
    );

    Ok(PackedHierarchy {
        width: options.width,
        height: options.height,
        padding: realized_padding,
        nodes: packed,
    })
}

struct Fit {
    /// Unit-space circles, relative to their parent's center.
    local: Vec<Circle>,
    /// Unit-to-pixel factor.
    scale: f64,
    padding: f64,
}

impl Fit {
    fn new(local: Vec<Circle>, target: f64, unit_padding: f64, requested: f64) -> Self {
        let root_r = local[0].r;
        let scale = if root_r > 0.0 { target / root_r } else { 0.0 };
        let achieved = unit_padding * scale;
        let padding = if achieved >= requested * (1.0 - FIT_REL_TOLERANCE) {
            requested
        } else {
            achieved
        };
        Self {
            local,
            scale,
            padding,
        }
    }
}

/// Packs the tree so that, scaled to a root radius of `target`, the gaps come out at `padding`.
///
/// The root radius `f(u)` is close to affine in the unit-space padding `u`, and the fit is the
/// fixed point `u = padding * f(u) / target`. Each refinement is a secant step on that model.
/// Once the slope says no fixed point exists the padding cannot fit; refining stops there and
/// the padding is realized smaller, leaving the leaves at a visible size.
fn fit_padding(hierarchy: &Hierarchy, padding: f64, target: f64) -> Fit {
    let bare = pack_local(hierarchy, 0.0);
    let bare_r = bare[0].r;
    if padding == 0.0 {
        return Fit::new(bare, target, 0.0, 0.0);
    }
    if bare_r <= 0.0 {
        // Only padding takes up room, so every unit padding yields the same geometry.
        return Fit::new(pack_local(hierarchy, 1.0), target, 1.0, padding);
    }

    let achieved = |local: &[Circle], unit: f64| unit * target / local[0].r;
    // Passes that honor the padding beat those that don't; among them, the closest wins.
    let rank = |a: f64| {
        if a >= padding * (1.0 - FIT_REL_TOLERANCE) {
            (false, a)
        } else {
            (true, -a)
        }
    };

    let mut prev = (0.0, bare_r);
    let mut unit = padding * bare_r / target;
    let mut local = pack_local(hierarchy, unit);
    let mut best = (local.clone(), unit, achieved(&local, unit));
    for _ in 2..MAX_PADDING_PASSES {
        let root_r = local[0].r;
        if (achieved(&local, unit) - padding).abs() <= padding * FIT_REL_TOLERANCE {
            break;
        }
        let slope = (root_r - prev.1) / (unit - prev.0);
        if slope.is_nan() || target <= padding * slope {
            break;
        }
        let next = padding * (root_r - slope * unit) / (target - padding * slope);
        if !(next.is_finite() && next > 0.0) {
            break;
        }
        prev = (unit, root_r);
        unit = next;
        local = pack_local(hierarchy, unit);

        let a = achieved(&local, unit);
        if rank(a).partial_cmp(&rank(best.2)).is_some_and(|o| o.is_lt()) {
            best = (local.clone(), unit, a);
        }
    }
    tracing::trace!(unit_padding = best.1, "fitted padding");
    Fit::new(best.0, target, best.1, padding)
}

/// Circles relative to their parent's center (the root sits at the origin).
fn pack_local(hierarchy: &Hierarchy, padding: f64) -> Vec<Circle> {
    let nodes = hierarchy.nodes();
    let mut local = vec![Circle::new(0.0, 0.0, 0.0); nodes.len()];
    let mut scratch: Vec<Circle> = Vec::new();

    // Reverse pre-order visits children before their parent.
    for idx in (0..nodes.len()).rev() {
        let node = &nodes[idx];
        if node.children.is_empty() {
            local[idx].r = node.value.max(0.0).sqrt();
            continue;
        }

        scratch.clear();
        scratch.extend(node.children.iter().map(|&c| local[c]));
        let enclosing = pack_siblings(&mut scratch, padding);
        for (&c, placed) in node.children.iter().zip(&scratch) {
            local[c].x = placed.x;
            local[c].y = placed.y;
        }
        local[idx].r = enclosing + padding / 2.0;
    }
    local
}
