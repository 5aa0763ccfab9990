//! Tag facets, autocomplete, processing statistics, and type quick filters.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Document;
use crate::tag_set::TagSet;

/// Default number of autocomplete suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;
/// Default page size of the tag browser.
pub const DEFAULT_BROWSE_LIMIT: usize = 20;

/// Every tag used by `documents`, in first-seen order.
pub fn all_tags(documents: &[Document]) -> TagSet {
    documents.iter().flat_map(|d| d.tags.iter()).collect()
}

/// Per-tag document counts, most used first, ties by tag name.
pub fn tag_counts(documents: &[Document]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        for tag in &doc.tags {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(tag, n)| (tag.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Autocomplete: tags containing `text` (case-insensitive), at most
/// `limit`. Blank text suggests nothing.
pub fn suggest_tags(all: &TagSet, text: &str, limit: usize) -> Vec<String> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    all.iter()
        .filter(|t| t.to_lowercase().contains(&needle))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Tag browser: tags not in `exclude`, optionally narrowed by a
/// case-insensitive filter, truncated to `limit` when given.
pub fn browse_tags(
    all: &TagSet,
    exclude: &TagSet,
    filter: Option<&str>,
    limit: Option<usize>,
) -> Vec<String> {
    let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
    let matching = all
        .iter()
        .filter(|t| !exclude.contains(t))
        .filter(|t| needle.is_empty() || t.to_lowercase().contains(&needle))
        .map(str::to_string);
    match limit {
        Some(n) => matching.take(n).collect(),
        None => matching.collect(),
    }
}

/// Document counts by processing status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub total: usize,
    pub processed: usize,
    pub processing: usize,
    pub error: usize,
}

impl DocumentStats {
    pub fn compute(documents: &[Document]) -> Self {
        let mut stats = Self {
            total: documents.len(),
            ..Default::default()
        };
        for doc in documents {
            match doc.processing_status.as_deref() {
                Some("processed") => stats.processed += 1,
                Some("processing") => stats.processing += 1,
                Some("error") => stats.error += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Quick filter by document type; `"all"` keeps everything.
pub fn filter_by_type<'a>(documents: &'a [Document], doc_type: &str) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|d| doc_type == "all" || d.document_type.as_deref() == Some(doc_type))
        .collect()
}

/// Document counts per type, most common first. Untyped documents count
/// as `other`.
pub fn type_counts(documents: &[Document]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        let t = doc
            .document_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("other");
        *counts.entry(t).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
