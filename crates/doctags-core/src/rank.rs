//! Relevance scoring for combined text + tag search.
//!
//! The score is a small integer sum of fixed weights. It is only used to
//! order results when sorting by relevance and is never stored.
//!
//! | Signal | Weight |
//! |--------|--------|
//! | required selection present in tags (each) | 10 |
//! | optional selection present in tags (each) | 5 |
//! | text in title | 8 |
//! | text in any tag | 7 |
//! | text in organization | 6 |
//! | text in extracted text | 3 |

use serde::Serialize;

use crate::models::{Document, SearchQuery};

pub const REQUIRED_SELECTION_WEIGHT: u32 = 10;
pub const OPTIONAL_SELECTION_WEIGHT: u32 = 5;
pub const TITLE_WEIGHT: u32 = 8;
pub const ORGANIZATION_WEIGHT: u32 = 6;
pub const TAG_TEXT_WEIGHT: u32 = 7;
pub const EXTRACTED_TEXT_WEIGHT: u32 = 3;

/// Scoring breakdown for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreExplanation {
    pub required_matches: u32,
    pub optional_matches: u32,
    pub title_match: bool,
    pub organization_match: bool,
    pub tag_text_match: bool,
    pub extracted_text_match: bool,
    pub total: u32,
}

/// Case-insensitive substring test against an optional field.
pub(crate) fn field_contains(field: Option<&str>, needle_lower: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle_lower))
}

pub fn explain(doc: &Document, query: &SearchQuery) -> ScoreExplanation {
    let required_matches = query
        .active_required()
        .filter(|(_, tag)| doc.tags.contains(tag))
        .count() as u32;
    let optional_matches = query
        .optional_selections
        .iter()
        .filter(|tag| doc.tags.contains(tag))
        .count() as u32;

    let mut out = ScoreExplanation {
        required_matches,
        optional_matches,
        ..Default::default()
    };

    if let Some(needle) = query.text_needle() {
        out.title_match = field_contains(doc.title.as_deref(), &needle);
        out.organization_match = field_contains(doc.organization.as_deref(), &needle);
        out.tag_text_match = doc.tags.any_contains_ignore_case(&needle);
        out.extracted_text_match = field_contains(doc.extracted_text.as_deref(), &needle);
    }

    out.total = required_matches * REQUIRED_SELECTION_WEIGHT
        + optional_matches * OPTIONAL_SELECTION_WEIGHT
        + weight_if(out.title_match, TITLE_WEIGHT)
        + weight_if(out.organization_match, ORGANIZATION_WEIGHT)
        + weight_if(out.tag_text_match, TAG_TEXT_WEIGHT)
        + weight_if(out.extracted_text_match, EXTRACTED_TEXT_WEIGHT);
    out
}

pub fn score(doc: &Document, query: &SearchQuery) -> u32 {
    explain(doc, query).total
}

fn weight_if(hit: bool, weight: u32) -> u32 {
    if hit {
        weight
    } else {
        0
    }
}
