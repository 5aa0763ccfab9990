//! Required-tag validation and the persistence gate.
//!
//! A document may leave the preview state only when every required group
//! has at least one of its tags. A required group with an empty vocabulary
//! can never be satisfied and is always reported.

use crate::error::{DocumentFailure, MissingGroup, PersistError};
use crate::models::{Document, TagGroup};
use crate::tag_set::TagSet;
use crate::taxonomy::required_groups;

/// Required groups whose vocabulary does not intersect `tags`, in
/// definition order.
pub fn missing_required_groups<'a>(tags: &TagSet, groups: &'a [TagGroup]) -> Vec<&'a TagGroup> {
    required_groups(groups)
        .filter(|g| !g.tags.intersects(tags))
        .collect()
}

pub fn can_persist(tags: &TagSet, groups: &[TagGroup]) -> bool {
    missing_required_groups(tags, groups).is_empty()
}

/// Failures for every document in `documents` that cannot be persisted.
pub fn check_batch(documents: &[Document], groups: &[TagGroup]) -> Vec<DocumentFailure> {
    documents
        .iter()
        .filter_map(|doc| {
            let missing = missing_required_groups(&doc.tags, groups);
            if missing.is_empty() {
                return None;
            }
            Some(DocumentFailure {
                document_id: doc.id.clone(),
                title: doc.display_title().to_string(),
                missing: missing
                    .into_iter()
                    .map(|g| MissingGroup {
                        group_id: g.id.clone(),
                        group_name: g.name.clone(),
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Batch gate: `Ok` only if every document can be persisted.
pub fn gate_batch(documents: &[Document], groups: &[TagGroup]) -> Result<(), PersistError> {
    let failures = check_batch(documents, groups);
    if failures.is_empty() {
        tracing::debug!(documents = documents.len(), "batch passed required-tag gate");
        Ok(())
    } else {
        tracing::debug!(
            documents = documents.len(),
            rejected = failures.len(),
            "batch rejected by required-tag gate"
        );
        Err(PersistError::MissingRequiredTags { failures })
    }
}
