//! Core data models: tag groups, documents, search queries, saved searches.
//!
//! Deserialization is deliberately forgiving. Records written by earlier
//! versions of the web client use `group_name`/`is_required`, camelCase
//! field names, integer ids, and date strings of varying precision; all of
//! these load without error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tag_set::TagSet;

/// A named vocabulary of tag values, flagged required or optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagGroup {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(alias = "group_name", alias = "groupName")]
    pub name: String,
    pub tags: TagSet,
    /// `None` means required. Use [`is_group_required`] instead of reading
    /// this field directly.
    #[serde(alias = "isRequired", skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

impl TagGroup {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            tags: TagSet::from_values(tags),
            is_required: None,
        }
    }

    /// Same group with an explicit required flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.is_required = Some(required);
        self
    }
}

/// A group is required unless it is explicitly marked `is_required: false`.
pub fn is_group_required(group: &TagGroup) -> bool {
    group.is_required != Some(false)
}

/// A document as seen by the tagging and search engine.
///
/// Persisted fields not listed here (file URLs, sizes, amounts) belong to
/// the storage layer and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub title: Option<String>,
    pub organization: Option<String>,
    #[serde(alias = "extractedText")]
    pub extracted_text: Option<String>,
    #[serde(alias = "documentNumber")]
    pub document_number: Option<String>,
    #[serde(alias = "documentType")]
    pub document_type: Option<String>,
    #[serde(alias = "originalFilename")]
    pub original_filename: Option<String>,
    #[serde(alias = "processingStatus")]
    pub processing_status: Option<String>,
    pub tags: TagSet,
    #[serde(alias = "aiSuggestedTags")]
    pub ai_suggested_tags: TagSet,
    #[serde(
        alias = "createdAt",
        alias = "created_date",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.id,
        }
    }
}

/// Sort key for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Date,
    Title,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "date" => Ok(Self::Date),
            "title" => Ok(Self::Title),
            other => bail!(
                "Unknown sort key: '{}'. Use relevance, date, or title.",
                other
            ),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
            Self::Title => "title",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => bail!("Unknown sort order: '{}'. Use asc or desc.", other),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// A transient search request over an in-memory document collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free text; blank means no text filter.
    pub text: String,
    /// Group id to the single selected tag of that group. Empty values
    /// are ignored.
    pub required_selections: BTreeMap<String, String>,
    /// OR-combined tag filter.
    pub optional_selections: TagSet,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercased query text, or `None` when it is blank. Surrounding
    /// whitespace only decides presence; it stays part of the needle.
    pub fn text_needle(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(self.text.to_lowercase())
        }
    }

    /// Non-empty required selections as `(group_id, tag)` pairs.
    pub fn active_required(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required_selections
            .iter()
            .filter(|(_, tag)| !tag.is_empty())
            .map(|(group, tag)| (group.as_str(), tag.as_str()))
    }

    /// Select `tag` for `group_id`, or clear the selection if `tag` is
    /// already the selected value.
    pub fn select_required(&mut self, group_id: &str, tag: &str) {
        let current = self.required_selections.get(group_id).map(String::as_str);
        if current == Some(tag) || tag.is_empty() {
            self.required_selections.remove(group_id);
        } else {
            self.required_selections
                .insert(group_id.to_string(), tag.to_string());
        }
    }

    pub fn toggle_optional(&mut self, tag: &str) {
        if !self.optional_selections.remove(tag) {
            self.optional_selections.insert(tag);
        }
    }

    /// Reset text and all tag selections. Sorting is kept.
    pub fn clear(&mut self) {
        self.text.clear();
        self.required_selections.clear();
        self.optional_selections = TagSet::new();
    }

    /// Number of active constraints: text counts once, each required
    /// selection and each optional tag count once.
    pub fn active_filter_count(&self) -> usize {
        usize::from(self.text_needle().is_some())
            + self.active_required().count()
            + self.optional_selections.len()
    }
}

/// A named query stored for reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    pub query: SearchQuery,
    pub created_at: DateTime<Utc>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_timestamp(&value))
}

/// Parse RFC 3339 strings, `YYYY-MM-DD[ HH:MM:SS]` strings, or Unix
/// timestamps (seconds, or milliseconds above 10^11). Anything else is
/// `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => {
            let ts = n.as_i64()?;
            if ts.abs() > 100_000_000_000 {
                DateTime::from_timestamp_millis(ts)
            } else {
                DateTime::from_timestamp(ts, 0)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_required_by_default() {
        let group = TagGroup::new("g1", "Family", ["Alice"]);
        assert!(is_group_required(&group));
        assert!(is_group_required(&group.clone().with_required(true)));
        assert!(!is_group_required(&group.with_required(false)));
    }

    #[test]
    fn test_tag_group_legacy_field_names() {
        let group: TagGroup = serde_json::from_value(json!({
            "id": 7,
            "group_name": "Family",
            "tags": ["Alice", "Bob", "Alice"],
            "is_required": null
        }))
        .unwrap();
        assert_eq!(group.id, "7");
        assert_eq!(group.name, "Family");
        assert_eq!(group.tags.len(), 2);
        assert!(is_group_required(&group));

        let camel: TagGroup = serde_json::from_value(json!({
            "id": "g2", "name": "Topics", "isRequired": false
        }))
        .unwrap();
        assert!(camel.tags.is_empty());
        assert!(!is_group_required(&camel));
    }

    #[test]
    fn test_document_partial_record() {
        let doc: Document = serde_json::from_value(json!({
            "id": "d1",
            "title": "Invoice #1",
            "tags": null,
            "aiSuggestedTags": ["Urgent"],
            "created_date": "2024-03-05"
        }))
        .unwrap();
        assert!(doc.tags.is_empty());
        assert_eq!(doc.ai_suggested_tags.as_slice(), &["Urgent"]);
        assert_eq!(doc.created_at.unwrap().day(), 5);
    }

    #[test]
    fn test_document_unparseable_date_is_none() {
        let doc: Document =
            serde_json::from_value(json!({"id": "d1", "created_at": "yesterday"})).unwrap();
        assert!(doc.created_at.is_none());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp(&json!("2024-01-02T03:04:05Z")).is_some());
        assert!(parse_timestamp(&json!("2024-01-02 03:04:05")).is_some());
        let secs = parse_timestamp(&json!(1_700_000_000)).unwrap();
        let millis = parse_timestamp(&json!(1_700_000_000_000i64)).unwrap();
        assert_eq!(secs, millis);
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let doc = Document {
            id: "d9".to_string(),
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.display_title(), "d9");
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::Date);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("newest".parse::<SortKey>().is_err());
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_query_selection_toggles() {
        let mut q = SearchQuery::new();
        q.select_required("g1", "Alice");
        assert_eq!(q.active_required().count(), 1);
        q.select_required("g1", "Alice");
        assert_eq!(q.active_required().count(), 0);

        q.toggle_optional("Urgent");
        q.toggle_optional("Tax");
        q.toggle_optional("Urgent");
        assert_eq!(q.optional_selections.as_slice(), &["Tax"]);

        q.text = "  invoice ".to_string();
        assert_eq!(q.text_needle().as_deref(), Some("  invoice "));
        assert_eq!(q.active_filter_count(), 2);

        q.text = " \t".to_string();
        assert_eq!(q.text_needle(), None);
        assert_eq!(q.active_filter_count(), 1);

        q.sort_key = SortKey::Title;
        q.clear();
        assert_eq!(q.active_filter_count(), 0);
        assert_eq!(q.sort_key, SortKey::Title);
    }

    #[test]
    fn test_empty_required_selection_is_inactive() {
        let mut q = SearchQuery::new();
        q.required_selections.insert("g1".to_string(), String::new());
        assert_eq!(q.active_required().count(), 0);
    }
}
