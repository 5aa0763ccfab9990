//! Ordered, de-duplicated tag collections.
//!
//! Every component (validator, ranker, pipeline, reconciler) consumes tags
//! through [`TagSet`]. Records coming from older clients are messy: the
//! `tags` field may be missing, `null`, a bare string, or an array that
//! contains numbers and blanks. [`TagSet::from_json`] accepts all of these
//! and never fails, so filtering and validation stay total functions.
//!
//! Insertion order is preserved because it is the display order of chips in
//! the editing views; membership tests are linear, which is fine for the
//! handful of tags a document carries.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An ordered set of tag values.
///
/// Blank values (empty or whitespace-only) are dropped on insertion and
/// duplicates keep their first position. Values are otherwise stored
/// verbatim: matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a set from any sequence of string-like values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for value in values {
            set.insert(value);
        }
        set
    }

    /// Total constructor from arbitrary JSON.
    ///
    /// | Input | Result |
    /// |-------|--------|
    /// | `null`, missing, object, bool, number | empty set |
    /// | `"tag"` | `{tag}` |
    /// | `["a", 1, "", "a", "b"]` | `{a, b}` |
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_values([s.as_str()]),
            Value::Array(items) => Self::from_values(items.iter().filter_map(Value::as_str)),
            _ => Self::new(),
        }
    }

    /// Insert a tag. Returns `false` for blank values and duplicates.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.trim().is_empty() || self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.0.retain(|t| keep(t));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// True if the two sets share at least one tag.
    pub fn intersects(&self, other: &TagSet) -> bool {
        self.0.iter().any(|t| other.contains(t))
    }

    /// Tags of `self` that are also in `other`, in `self` order.
    pub fn intersection(&self, other: &TagSet) -> TagSet {
        self.iter().filter(|t| other.contains(t)).collect()
    }

    /// Tags of `self` that are not in `other`, in `self` order.
    pub fn difference(&self, other: &TagSet) -> TagSet {
        self.iter().filter(|t| !other.contains(t)).collect()
    }

    /// True if any tag contains `needle_lower` as a case-insensitive
    /// substring. `needle_lower` must already be lowercased.
    pub fn any_contains_ignore_case(&self, needle_lower: &str) -> bool {
        self.0
            .iter()
            .any(|t| t.to_lowercase().contains(needle_lower))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .iter()
            .map(String::as_str as fn(&'a String) -> &'a str)
    }
}

impl From<Vec<String>> for TagSet {
    fn from(values: Vec<String>) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedup_keeps_first_position() {
        let set = TagSet::from_values(["b", "a", "b", "c", "a"]);
        assert_eq!(set.as_slice(), &["b", "a", "c"]);
    }

    #[test]
    fn test_blank_values_dropped() {
        let set = TagSet::from_values(["", "  ", "x"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("x"));
    }

    #[test]
    fn test_from_json_total() {
        assert!(TagSet::from_json(&json!(null)).is_empty());
        assert!(TagSet::from_json(&json!({"a": 1})).is_empty());
        assert!(TagSet::from_json(&json!(42)).is_empty());
        assert_eq!(TagSet::from_json(&json!("solo")).as_slice(), &["solo"]);
        let mixed = TagSet::from_json(&json!(["a", 1, null, "", "a", "b"]));
        assert_eq!(mixed.as_slice(), &["a", "b"]);
    }

    #[test]
    fn test_deserialize_missing_and_null_fields() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            tags: TagSet,
        }
        let missing: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(missing.tags.is_empty());
        let null: Holder = serde_json::from_value(json!({"tags": null})).unwrap();
        assert!(null.tags.is_empty());
        let list: Holder = serde_json::from_value(json!({"tags": ["x", "y"]})).unwrap();
        assert_eq!(list.tags.len(), 2);
    }

    #[test]
    fn test_serializes_as_array() {
        let set = TagSet::from_values(["a", "b"]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn test_set_operations() {
        let a = TagSet::from_values(["x", "y", "z"]);
        let b = TagSet::from_values(["z", "w"]);
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b).as_slice(), &["z"]);
        assert_eq!(a.difference(&b).as_slice(), &["x", "y"]);
        assert!(!a.intersects(&TagSet::new()));
    }

    #[test]
    fn test_matching_is_case_sensitive_but_substring_helper_is_not() {
        let set = TagSet::from_values(["Invoice"]);
        assert!(!set.contains("invoice"));
        assert!(set.any_contains_ignore_case("voic"));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut set = TagSet::new();
        assert!(set.insert("a"));
        assert!(!set.insert("a"));
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert!(set.is_empty());
    }
}
