use crate::Result;
use serde::{Deserialize, Serialize};

/// One flat input entry: a delimiter-joined path plus an optional weight.
///
/// Only leaves need a value; branch records may omit it (or set it to `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Record {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
        }
    }

    /// A record without a declared value (typically a branch).
    pub fn branch(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: None,
        }
    }
}

/// Parses a JSON array of `{ "id": ..., "value": ... }` objects.
pub fn records_from_json_str(text: &str) -> Result<Vec<Record>> {
    Ok(serde_json::from_str(text)?)
}

/// Returns the last path segment of `id`.
pub fn label_of<'a>(id: &'a str, delimiter: &str) -> &'a str {
    if delimiter.is_empty() {
        return id;
    }
    id.rsplit(delimiter).next().unwrap_or(id)
}

/// Returns the id of the parent record, or `None` for a top-level id.
///
/// The parent is the text before the last delimiter. A leading delimiter yields an empty
/// prefix, which counts as top level.
pub fn parent_id<'a>(id: &'a str, delimiter: &str) -> Option<&'a str> {
    if delimiter.is_empty() {
        return None;
    }
    match id.rfind(delimiter) {
        Some(pos) if pos > 0 => Some(&id[..pos]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_last_segment() {
        assert_eq!(label_of("some|path", "|"), "path");
        assert_eq!(label_of("some", "|"), "some");
        assert_eq!(label_of("a::b::c", "::"), "c");
        assert_eq!(label_of("a|", "|"), "");
    }

    #[test]
    fn parent_is_prefix_before_last_delimiter() {
        assert_eq!(parent_id("a|b|c", "|"), Some("a|b"));
        assert_eq!(parent_id("a", "|"), None);
        assert_eq!(parent_id("|a", "|"), None);
        assert_eq!(parent_id("a::b", "::"), Some("a"));
    }

    #[test]
    fn records_parse_with_optional_values() {
        let records = records_from_json_str(
            r#"[{"id":"some|path","value":1},{"id":"some"},{"id":"x","value":null}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], Record::new("some|path", 1.0));
        assert_eq!(records[1], Record::branch("some"));
        assert_eq!(records[2].value, None);
    }

    #[test]
    fn records_reject_non_array_json() {
        assert!(records_from_json_str(r#"{"id":"a"}"#).is_err());
    }
}
