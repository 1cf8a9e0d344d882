pub type Result<T> = std::result::Result<T, Error>;

/// Malformed input detected while turning path records into a hierarchy.
///
/// None of these are recovered internally; the caller has to fix the records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no records to build a hierarchy from")]
    EmptyInput,

    #[error("path delimiter must not be empty")]
    EmptyDelimiter,

    #[error("record #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate record id: {id}")]
    DuplicateId { id: String },

    #[error("record `{id}` has no parent record `{parent}`")]
    OrphanId { id: String, parent: String },

    #[error("records have no top-level entry")]
    NoRoot,

    #[error("multiple top-level records: {}", roots.join(", "))]
    MultipleRoots { roots: Vec<String> },

    #[error("record `{id}` has an invalid value: {value}")]
    InvalidValue { id: String, value: f64 },

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}
