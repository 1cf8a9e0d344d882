//! Reconstructs a rooted tree from flat path records.
//!
//! Nodes live in an arena stored in pre-order: the root is index 0 and every child index is
//! greater than its parent's. Parents are referenced by index, never owned.

use crate::config::DEFAULT_DELIMITER;
use crate::record::{Record, label_of, parent_id};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    pub label: String,
    /// Value declared on the record itself (0 when absent).
    pub own_value: f64,
    /// `own_value` plus the values of all children.
    pub value: f64,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyOptions {
    pub delimiter: String,
    /// Create an unnamed root (id `""`) when several records are top level.
    /// When disabled, more than one top-level record is an error.
    pub synthetic_root: bool,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            synthetic_root: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    delimiter: String,
    nodes: Vec<HierarchyNode>,
    #[serde(skip)]
    index_by_id: FxHashMap<String, usize>,
}

impl Hierarchy {
    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[0]
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// All nodes in pre-order (root first).
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HierarchyNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn find(&self, id: &str) -> Option<&HierarchyNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        let node = self.find(id)?;
        node.parent.map(|p| self.nodes[p].id.as_str())
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.nodes
            .get(index)
            .into_iter()
            .flat_map(|n| n.children.iter().map(|&c| &self.nodes[c]))
    }

    pub fn descendants(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.nodes.iter()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Indices from `index` up to the root, inclusive.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = (index < self.nodes.len()).then_some(index);
        while let Some(idx) = cursor {
            out.push(idx);
            cursor = self.nodes[idx].parent;
        }
        out
    }

    /// Sum of the declared values of all leaves under `index`.
    pub fn leaf_sum(&self, index: usize) -> f64 {
        let Some(node) = self.nodes.get(index) else {
            return 0.0;
        };
        if node.is_leaf() {
            return node.value;
        }
        node.children.iter().map(|&c| self.leaf_sum(c)).sum()
    }
}

/// Builds the hierarchy with the given delimiter and no synthetic root.
pub fn build(records: &[Record], delimiter: &str) -> Result<Hierarchy> {
    build_with(
        records,
        &HierarchyOptions {
            delimiter: delimiter.to_string(),
            ..Default::default()
        },
    )
}

pub fn build_with(records: &[Record], options: &HierarchyOptions) -> Result<Hierarchy> {
    let delimiter = options.delimiter.as_str();
    if delimiter.is_empty() {
        return Err(Error::EmptyDelimiter);
    }
    if records.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut record_by_id: FxHashMap<&str, usize> = FxHashMap::default();
    for (index, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            return Err(Error::EmptyId { index });
        }
        if let Some(value) = record.value {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidValue {
                    id: record.id.clone(),
                    value,
                });
            }
        }
        if record_by_id.insert(record.id.as_str(), index).is_some() {
            return Err(Error::DuplicateId {
                id: record.id.clone(),
            });
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut top_level: Vec<usize> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let Some(parent) = parent_id(&record.id, delimiter) else {
            top_level.push(index);
            continue;
        };
        let Some(&parent_index) = record_by_id.get(parent) else {
            return Err(Error::OrphanId {
                id: record.id.clone(),
                parent: parent.to_string(),
            });
        };
        children[parent_index].push(index);
    }

    let by_id = |a: &usize, b: &usize| compare_ids(&records[*a].id, &records[*b].id);
    for list in &mut children {
        list.sort_by(by_id);
    }
    top_level.sort_by(by_id);

    let mut nodes: Vec<HierarchyNode> = Vec::with_capacity(records.len() + 1);
    // (record index, parent node index, depth)
    let mut stack: Vec<(usize, Option<usize>, usize)> = Vec::new();
    match top_level.as_slice() {
        [] => return Err(Error::NoRoot),
        [root] => stack.push((*root, None, 0)),
        many if options.synthetic_root => {
            nodes.push(HierarchyNode {
                id: String::new(),
                label: String::new(),
                own_value: 0.0,
                value: 0.0,
                depth: 0,
                parent: None,
                children: Vec::new(),
            });
            for &r in many.iter().rev() {
                stack.push((r, Some(0), 1));
            }
        }
        many => {
            return Err(Error::MultipleRoots {
                roots: many.iter().map(|&i| records[i].id.clone()).collect(),
            });
        }
    }

    while let Some((record_index, parent, depth)) = stack.pop() {
        let record = &records[record_index];
        let idx = nodes.len();
        let own_value = record.value.unwrap_or(0.0);
        nodes.push(HierarchyNode {
            id: record.id.clone(),
            label: label_of(&record.id, delimiter).to_string(),
            own_value,
            value: own_value,
            depth,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            nodes[p].children.push(idx);
        }
        for &c in children[record_index].iter().rev() {
            stack.push((c, Some(idx), depth + 1));
        }
    }

    // Pre-order guarantees children sit after their parent, so a reverse sweep is post-order.
    for idx in (0..nodes.len()).rev() {
        if nodes[idx].children.is_empty() {
            continue;
        }
        let sum: f64 = nodes[idx].children.iter().map(|&c| nodes[c].value).sum();
        nodes[idx].value = nodes[idx].own_value + sum;
    }

    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(idx, n)| (n.id.clone(), idx))
        .collect::<FxHashMap<_, _>>();

    tracing::debug!(
        records = records.len(),
        nodes = nodes.len(),
        root = %nodes[0].id,
        "built hierarchy"
    );

    Ok(Hierarchy {
        delimiter: delimiter.to_string(),
        nodes,
        index_by_id,
    })
}

/// Case-insensitive id ordering; ties fall back to plain string order.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
