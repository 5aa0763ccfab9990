//! Upload preview helpers: duplicate detection and document numbering.
//!
//! Uploaded files are staged as preview [`Document`]s. Before anything is
//! saved the caller checks the batch for duplicates against the user's
//! existing documents and runs the required-tag gate
//! ([`gate_batch`](crate::validate::gate_batch)).

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Document;

/// An incoming document that matches one already stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateMatch {
    pub file_name: String,
    pub existing_id: String,
    pub existing_title: String,
}

/// `report.pdf` → `report`; `archive.tar.gz` → `archive`.
fn name_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Find incoming files already present among `existing`.
///
/// A file duplicates a stored document when the stored original filename
/// equals the file name, or the stored title equals the file name up to
/// its first `.`. Each file reports its first match only.
pub fn find_duplicates<'a, I>(file_names: I, existing: &[Document]) -> Vec<DuplicateMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    file_names
        .into_iter()
        .filter_map(|name| {
            let stem = name_stem(name);
            existing
                .iter()
                .find(|doc| {
                    doc.original_filename.as_deref() == Some(name)
                        || doc.title.as_deref() == Some(stem)
                })
                .map(|doc| DuplicateMatch {
                    file_name: name.to_string(),
                    existing_id: doc.id.clone(),
                    existing_title: doc.display_title().to_string(),
                })
        })
        .collect()
}

/// `DOC-YYYYMMDD-NNNNNN`, where `NNNNNN` is the last six digits of the
/// millisecond timestamp.
pub fn document_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("DOC-{}-{:06}", now.format("%Y%m%d"), millis)
}

/// Fill in what an upload would have assigned: id, document number,
/// creation time, title from the file name, and processing status.
/// Fields already set are kept.
pub fn prepare_preview(doc: &mut Document, now: DateTime<Utc>) {
    if doc.id.trim().is_empty() {
        doc.id = Uuid::new_v4().to_string();
    }
    if doc.document_number.as_deref().map_or(true, str::is_empty) {
        doc.document_number = Some(document_number(now));
    }
    if doc.created_at.is_none() {
        doc.created_at = Some(now);
    }
    if doc.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        if let Some(name) = doc.original_filename.as_deref() {
            doc.title = Some(name_stem(name).to_string());
        }
    }
    if doc.processing_status.is_none() {
        doc.processing_status = Some("processed".to_string());
    }
}
