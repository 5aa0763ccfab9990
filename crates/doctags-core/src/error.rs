use std::fmt;

use serde::Serialize;

/// A required group that a document does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingGroup {
    pub group_id: String,
    pub group_name: String,
}

/// One document rejected by the persistence gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub title: String,
    pub missing: Vec<MissingGroup>,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.missing.iter().map(|m| m.group_name.as_str()).collect();
        write!(f, "{} (missing: {})", self.title, names.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("{} document(s) missing required tags: {}", .failures.len(), join_failures(.failures))]
    MissingRequiredTags { failures: Vec<DocumentFailure> },
}

fn join_failures(failures: &[DocumentFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("tag group not found: {0}")]
    UnknownGroup(String),

    #[error("tag group name must not be blank")]
    BlankName,

    #[error("tag {tag:?} is not in group {group}")]
    TagNotInGroup { group: String, tag: String },
}
