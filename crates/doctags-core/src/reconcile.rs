//! Partition a document's tags into display buckets for editing views.
//!
//! Both the upload preview and the document editor show tags grouped the
//! same way: chips under each required group, chips under each optional
//! group, remaining free-form tags, and AI suggestions that are not yet
//! accepted. Every current tag lands in exactly one bucket. When a tag is
//! in more than one group's vocabulary, the first group in definition order
//! claims it.

use serde::Serialize;

use crate::models::{is_group_required, TagGroup};
use crate::tag_set::TagSet;
use crate::taxonomy::vocabulary;

/// Tags of one group, as shown under that group's heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTags {
    pub group_id: String,
    pub group_name: String,
    pub required: bool,
    /// Current tags claimed by this group.
    pub selected: TagSet,
    /// AI-suggested tags from this group's vocabulary that are not
    /// selected yet; offered inline under the group.
    pub suggested: TagSet,
    /// Some current tag is in this group's vocabulary, whether or not an
    /// earlier group claimed it for display.
    pub satisfied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagBuckets {
    pub required_group_tags: Vec<GroupTags>,
    pub optional_group_tags: Vec<GroupTags>,
    pub freeform_tags: TagSet,
    /// AI suggestions that are neither selected nor in any group.
    pub available_suggestions: TagSet,
}

impl TagBuckets {
    /// Required groups with no current tag from their vocabulary.
    pub fn unsatisfied(&self) -> impl Iterator<Item = &GroupTags> {
        self.required_group_tags.iter().filter(|g| !g.satisfied)
    }

    /// All tags across the group and free-form buckets.
    pub fn all_tags(&self) -> TagSet {
        self.required_group_tags
            .iter()
            .chain(&self.optional_group_tags)
            .flat_map(|g| g.selected.iter())
            .chain(self.freeform_tags.iter())
            .collect()
    }
}

pub fn reconcile(current: &TagSet, ai_suggested: &TagSet, groups: &[TagGroup]) -> TagBuckets {
    let mut claimed = TagSet::new();
    let mut offered = TagSet::new();
    let mut buckets = TagBuckets::default();

    for group in groups {
        let selected: TagSet = current
            .iter()
            .filter(|t| group.tags.contains(t) && !claimed.contains(t))
            .collect();
        claimed.extend(selected.iter());

        let suggested: TagSet = ai_suggested
            .iter()
            .filter(|t| group.tags.contains(t) && !current.contains(t) && !offered.contains(t))
            .collect();
        offered.extend(suggested.iter());

        let entry = GroupTags {
            group_id: group.id.clone(),
            group_name: group.name.clone(),
            required: is_group_required(group),
            selected,
            suggested,
            satisfied: group.tags.intersects(current),
        };
        if entry.required {
            buckets.required_group_tags.push(entry);
        } else {
            buckets.optional_group_tags.push(entry);
        }
    }

    let vocab = vocabulary(groups);
    buckets.freeform_tags = current.difference(&vocab);
    buckets.available_suggestions = ai_suggested.difference(current).difference(&vocab);
    buckets
}
