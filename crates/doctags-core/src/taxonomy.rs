//! The user's tag taxonomy: an ordered list of [`TagGroup`]s.
//!
//! [`Taxonomy`] is the read side consumed by the validator, the search
//! pipeline, and the reconciler, plus the editing operations behind the
//! settings screen. Persisting it is the store's job
//! ([`DocumentStore::save_taxonomy`](crate::store::DocumentStore::save_taxonomy)).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TaxonomyError;
use crate::models::{is_group_required, TagGroup};
use crate::tag_set::TagSet;

/// Required groups of `groups`, in definition order.
pub fn required_groups(groups: &[TagGroup]) -> impl Iterator<Item = &TagGroup> {
    groups.iter().filter(|g| is_group_required(g))
}

/// Optional groups (explicit `is_required: false`), in definition order.
pub fn optional_groups(groups: &[TagGroup]) -> impl Iterator<Item = &TagGroup> {
    groups.iter().filter(|g| !is_group_required(g))
}

/// Union of every group's vocabulary, in definition order.
pub fn vocabulary(groups: &[TagGroup]) -> TagSet {
    groups.iter().flat_map(|g| g.tags.iter()).collect()
}

/// An ordered sequence of tag groups owned by one user.
///
/// An empty taxonomy is valid and means nothing is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    groups: Vec<TagGroup>,
}

impl Taxonomy {
    pub fn new(groups: Vec<TagGroup>) -> Self {
        Self { groups }
    }

    /// Load from a stored `tagging_preferences` value.
    ///
    /// `null` and non-arrays give an empty taxonomy; array entries that are
    /// not group objects are skipped. Groups with a blank or repeated id get
    /// a fresh one so every group stays addressable.
    pub fn from_json(value: &Value) -> Self {
        let mut groups: Vec<TagGroup> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match serde_json::from_value::<TagGroup>(item.clone()) {
                    Ok(group) if item.is_object() => Some(group),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed tag group");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut seen = std::collections::HashSet::new();
        for group in &mut groups {
            if group.id.trim().is_empty() || !seen.insert(group.id.clone()) {
                let id = Uuid::new_v4().to_string();
                tracing::debug!(group = %group.name, old_id = %group.id, new_id = %id, "assigned tag group id");
                group.id = id.clone();
                seen.insert(id);
            }
        }
        Self { groups }
    }

    pub fn list_groups(&self) -> &[TagGroup] {
        &self.groups
    }

    pub fn required_groups(&self) -> Vec<&TagGroup> {
        required_groups(&self.groups).collect()
    }

    pub fn optional_groups(&self) -> Vec<&TagGroup> {
        optional_groups(&self.groups).collect()
    }

    pub fn group(&self, id: &str) -> Option<&TagGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Look a group up by id, falling back to a case-insensitive name match.
    pub fn find(&self, id_or_name: &str) -> Option<&TagGroup> {
        self.group(id_or_name).or_else(|| {
            let lower = id_or_name.to_lowercase();
            self.groups.iter().find(|g| g.name.to_lowercase() == lower)
        })
    }

    /// First group (definition order) whose vocabulary contains `tag`.
    pub fn group_for_tag(&self, tag: &str) -> Option<&TagGroup> {
        self.groups.iter().find(|g| g.tags.contains(tag))
    }

    pub fn vocabulary(&self) -> TagSet {
        vocabulary(&self.groups)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<TagGroup> {
        self.groups
    }

    /// Append a new, empty group and return its id.
    pub fn add_group(&mut self, name: &str, required: bool) -> Result<String, TaxonomyError> {
        let name = non_blank(name)?;
        let id = Uuid::new_v4().to_string();
        self.groups.push(TagGroup {
            id: id.clone(),
            name,
            tags: TagSet::new(),
            is_required: Some(required),
        });
        Ok(id)
    }

    pub fn rename_group(&mut self, id: &str, name: &str) -> Result<(), TaxonomyError> {
        let name = non_blank(name)?;
        self.group_mut(id)?.name = name;
        Ok(())
    }

    /// Store an explicit required flag, replacing any implicit default.
    pub fn set_required(&mut self, id: &str, required: bool) -> Result<(), TaxonomyError> {
        self.group_mut(id)?.is_required = Some(required);
        Ok(())
    }

    pub fn remove_group(&mut self, id: &str) -> Result<TagGroup, TaxonomyError> {
        let pos = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| TaxonomyError::UnknownGroup(id.to_string()))?;
        Ok(self.groups.remove(pos))
    }

    /// Add a tag to a group's vocabulary. Returns `false` if the tag was
    /// blank or already present.
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<bool, TaxonomyError> {
        Ok(self.group_mut(id)?.tags.insert(tag))
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool, TaxonomyError> {
        Ok(self.group_mut(id)?.tags.remove(tag))
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut TagGroup, TaxonomyError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| TaxonomyError::UnknownGroup(id.to_string()))
    }
}

impl From<Vec<TagGroup>> for Taxonomy {
    fn from(groups: Vec<TagGroup>) -> Self {
        Self::new(groups)
    }
}

fn non_blank(name: &str) -> Result<String, TaxonomyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(TaxonomyError::BlankName)
    } else {
        Ok(trimmed.to_string())
    }
}
