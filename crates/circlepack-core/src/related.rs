//! Resolves which hierarchy ids are "related" to a selection of labels.
//!
//! A record matches when its id contains any selected label as a plain, case-sensitive
//! substring (`"ab"` matches `"xaby"`). Every ancestor-or-self prefix of every match is related.

use crate::record::Record;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// One label or a collection of labels to look up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection<'a> {
    labels: Vec<Cow<'a, str>>,
}

impl<'a> Selection<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(|l| l.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> From<&'a str> for Selection<'a> {
    fn from(label: &'a str) -> Self {
        Self::new().with(label)
    }
}

impl<'a> From<&'a String> for Selection<'a> {
    fn from(label: &'a String) -> Self {
        Self::new().with(label.as_str())
    }
}

impl From<String> for Selection<'static> {
    fn from(label: String) -> Self {
        Self::new().with(label)
    }
}

impl<'a> From<&'a [&'a str]> for Selection<'a> {
    fn from(labels: &'a [&'a str]) -> Self {
        labels.iter().copied().collect()
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Selection<'a> {
    fn from(labels: [&'a str; N]) -> Self {
        labels.into_iter().collect()
    }
}

impl<'a> From<&'a [String]> for Selection<'a> {
    fn from(labels: &'a [String]) -> Self {
        labels.iter().map(String::as_str).collect()
    }
}

impl<'a> From<Vec<&'a str>> for Selection<'a> {
    fn from(labels: Vec<&'a str>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<Vec<String>> for Selection<'static> {
    fn from(labels: Vec<String>) -> Self {
        labels.into_iter().collect()
    }
}

impl<'a, L: Into<Cow<'a, str>>> FromIterator<L> for Selection<'a> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Set of related hierarchy ids, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelatedIds(BTreeSet<String>);

impl RelatedIds {
    /// Whether a node should be shown in its active state.
    pub fn is_active(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }

    pub fn into_set(self) -> BTreeSet<String> {
        self.0
    }
}

impl IntoIterator for RelatedIds {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub fn resolve<'a>(
    selection: impl Into<Selection<'a>>,
    records: &[Record],
    delimiter: &str,
) -> RelatedIds {
    let selection = selection.into();
    let mut out = BTreeSet::new();
    if selection.is_empty() {
        return RelatedIds(out);
    }

    let mut matched = 0usize;
    for record in records {
        if selection.labels().any(|label| record.id.contains(label)) {
            matched += 1;
            push_prefixes(&record.id, delimiter, &mut out);
        }
    }

    tracing::trace!(matched, related = out.len(), "resolved related ids");
    RelatedIds(out)
}

pub fn resolve_label(label: &str, records: &[Record], delimiter: &str) -> RelatedIds {
    resolve(label, records, delimiter)
}

fn push_prefixes(path: &str, delimiter: &str, out: &mut BTreeSet<String>) {
    if !delimiter.is_empty() {
        for (pos, _) in path.match_indices(delimiter) {
            out.insert(path[..pos].to_string());
        }
    }
    out.insert(path.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![Record::new("some|path", 1.0), Record::new("some", 3.0)]
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn match_pulls_in_every_ancestor() {
        let ids = resolve(["path"], &sample(), "|");
        assert_eq!(ids.as_set(), &set(&["some", "some|path"]));
        assert!(ids.is_active("some"));
        assert!(!ids.is_active("path"));
    }

    #[test]
    fn single_label_form_matches_collection_form() {
        let records = sample();
        assert_eq!(
            resolve_label("path", &records, "|"),
            resolve(vec!["path"], &records, "|")
        );
        assert_eq!(
            resolve(String::from("path"), &records, "|"),
            resolve(&["path".to_string()][..], &records, "|")
        );
    }

    #[test]
    fn empty_selection_yields_empty_set() {
        let empty: [&str; 0] = [];
        assert!(resolve(empty, &sample(), "|").is_empty());
        assert!(resolve(Selection::new(), &sample(), "|").is_empty());
        assert!(resolve(["nothing-here"], &sample(), "|").is_empty());
    }

    #[test]
    fn matching_is_unanchored_and_case_sensitive() {
        let records = vec![
            Record::branch("x"),
            Record::new("x|xaby", 1.0),
            Record::new("x|AB", 1.0),
        ];
        let ids = resolve(["ab"], &records, "|");
        assert_eq!(ids.as_set(), &set(&["x", "x|xaby"]));
    }

    #[test]
    fn separator_in_label_matches_across_segments() {
        let records = vec![
            Record::branch("a"),
            Record::branch("a|b"),
            Record::new("a|b|c", 1.0),
        ];
        let ids = resolve(["a|b"], &records, "|");
        assert_eq!(ids.as_set(), &set(&["a", "a|b", "a|b|c"]));
    }

    #[test]
    fn empty_segments_are_kept_in_prefixes() {
        let records = vec![Record::new("a||b", 1.0)];
        let ids = resolve(["b"], &records, "|");
        assert_eq!(ids.as_set(), &set(&["a", "a|", "a||b"]));
    }

    #[test]
    fn multi_character_delimiter() {
        let records = vec![Record::new("root::mid::leaf", 1.0)];
        let ids = resolve(["leaf"], &records, "::");
        assert_eq!(ids.as_set(), &set(&["root", "root::mid", "root::mid::leaf"]));
    }

    #[test]
    fn empty_label_matches_every_record() {
        let ids = resolve([""], &sample(), "|");
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn resolving_is_idempotent_and_union_monotonic() {
        let records = vec![
            Record::branch("r"),
            Record::branch("r|a"),
            Record::new("r|a|x", 1.0),
            Record::new("r|b", 2.0),
            Record::new("r|c", 3.0),
        ];
        let a = resolve(["x"], &records, "|");
        let b = resolve(["b"], &records, "|");
        let both = resolve(["x", "b"], &records, "|");
        assert_eq!(a, resolve(["x"], &records, "|"));
        assert!(both.as_set().is_superset(a.as_set()));
        assert!(both.as_set().is_superset(b.as_set()));
        assert_eq!(both.len(), 4);
    }
}
