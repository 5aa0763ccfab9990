//! Search filter pipeline over an in-memory document collection.
//!
//! The pipeline has no storage or configuration dependencies. The caller
//! fetches the user's documents and taxonomy, builds a [`SearchQuery`], and
//! re-runs [`filter_and_sort`] whenever any query field changes.
//!
//! # Algorithm
//!
//! 1. Text filter: keep documents whose title, organization, extracted
//!    text, document number, or any tag contains the query text
//!    (case-insensitive). Blank text keeps everything.
//! 2. Required-tag filter: every non-empty selection must be one of the
//!    document's tags (AND across groups).
//! 3. Optional-tag filter: if any optional tags are selected, the document
//!    must carry at least one of them (OR).
//! 4. Sort by relevance score, `created_at`, or title, ascending or
//!    descending. The sort is stable, so ties keep input order.
//!
//! Input documents are never modified; the relevance score lives on the
//! returned [`SearchHit`].

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::models::{Document, SearchQuery, SortKey, SortOrder, TagGroup};
use crate::rank::{self, field_contains};

/// One document that passed every filter.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    pub document: &'a Document,
    /// Relevance score, present only when sorting by relevance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Counts reported alongside a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub total: usize,
    pub filtered: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome<'a> {
    pub hits: Vec<SearchHit<'a>>,
    pub stats: SearchStats,
}

/// Stage 1: case-insensitive substring match on the searchable fields.
/// `needle_lower` must already be lowercased.
pub fn matches_text(doc: &Document, needle_lower: &str) -> bool {
    field_contains(doc.title.as_deref(), needle_lower)
        || field_contains(doc.organization.as_deref(), needle_lower)
        || field_contains(doc.extracted_text.as_deref(), needle_lower)
        || field_contains(doc.document_number.as_deref(), needle_lower)
        || doc.tags.any_contains_ignore_case(needle_lower)
}

/// Stage 2: all active required selections are present.
pub fn matches_required(doc: &Document, query: &SearchQuery) -> bool {
    query.active_required().all(|(_, tag)| doc.tags.contains(tag))
}

/// Stage 3: no optional selection, or at least one selected tag present.
pub fn matches_optional(doc: &Document, query: &SearchQuery) -> bool {
    query.optional_selections.is_empty() || doc.tags.intersects(&query.optional_selections)
}

/// Filter and order `documents` for `query`.
///
/// `groups` is the caller's taxonomy; selections keyed by an id that is not
/// in it still filter, since a document's tags are what matter.
pub fn filter_and_sort<'a>(
    documents: &'a [Document],
    query: &SearchQuery,
    groups: &[TagGroup],
) -> Vec<SearchHit<'a>> {
    for (group_id, tag) in query.active_required() {
        if !groups.iter().any(|g| g.id == group_id) {
            tracing::debug!(group_id, tag, "selection for a group outside the taxonomy");
        }
    }

    let needle = query.text_needle();
    let mut hits: Vec<SearchHit<'a>> = documents
        .iter()
        .filter(|doc| needle.as_deref().map_or(true, |n| matches_text(doc, n)))
        .filter(|doc| matches_required(doc, query))
        .filter(|doc| matches_optional(doc, query))
        .map(|document| SearchHit {
            document,
            score: None,
        })
        .collect();

    if query.sort_key == SortKey::Relevance {
        for hit in &mut hits {
            hit.score = Some(rank::score(hit.document, query));
        }
    }

    sort_hits(&mut hits, query.sort_key, query.sort_order);

    tracing::debug!(
        total = documents.len(),
        filtered = hits.len(),
        sort = %query.sort_key,
        order = %query.sort_order,
        "search pipeline finished"
    );
    hits
}

/// [`filter_and_sort`] plus result counts and timing.
pub fn run_search<'a>(
    documents: &'a [Document],
    query: &SearchQuery,
    groups: &[TagGroup],
) -> SearchOutcome<'a> {
    let started = Instant::now();
    let hits = filter_and_sort(documents, query, groups);
    let stats = SearchStats {
        total: documents.len(),
        filtered: hits.len(),
        elapsed: started.elapsed(),
    };
    SearchOutcome { hits, stats }
}

fn sort_hits(hits: &mut [SearchHit<'_>], key: SortKey, order: SortOrder) {
    let compare = |a: &SearchHit<'_>, b: &SearchHit<'_>| -> Ordering {
        match key {
            SortKey::Relevance => a.score.unwrap_or(0).cmp(&b.score.unwrap_or(0)),
            SortKey::Date => a.document.created_at.cmp(&b.document.created_at),
            SortKey::Title => title_key(a.document).cmp(title_key(b.document)),
        }
    };
    match order {
        SortOrder::Asc => hits.sort_by(compare),
        SortOrder::Desc => hits.sort_by(|a, b| compare(b, a)),
    }
}

fn title_key(doc: &Document) -> &str {
    doc.title.as_deref().unwrap_or("")
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
