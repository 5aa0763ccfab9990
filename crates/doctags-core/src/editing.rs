//! Tag edits applied to a document's tag set from the editing views.
//!
//! Each function returns the new tag set; the caller runs the result
//! through the persistence gate before saving.

use crate::error::TaxonomyError;
use crate::models::TagGroup;
use crate::tag_set::TagSet;
use crate::taxonomy::vocabulary;

/// Toggle `tag` within `group`.
///
/// A group holds one selection: choosing a tag replaces the group's other
/// tags, and choosing the selected tag again removes it. Tags outside the
/// group are untouched. `tag` must be in the group's vocabulary.
pub fn select_group_tag(
    current: &TagSet,
    group: &TagGroup,
    tag: &str,
) -> Result<TagSet, TaxonomyError> {
    if !group.tags.contains(tag) {
        return Err(TaxonomyError::TagNotInGroup {
            group: group.name.clone(),
            tag: tag.to_string(),
        });
    }
    if current.contains(tag) {
        let mut next = current.clone();
        next.remove(tag);
        return Ok(next);
    }
    let mut next: TagSet = current.iter().filter(|t| !group.tags.contains(t)).collect();
    next.insert(tag);
    Ok(next)
}

/// Add a free-form tag; blank and duplicate tags are ignored.
pub fn add_freeform_tag(current: &TagSet, tag: &str) -> TagSet {
    let mut next = current.clone();
    next.insert(tag.trim());
    next
}

pub fn remove_tag(current: &TagSet, tag: &str) -> TagSet {
    let mut next = current.clone();
    next.remove(tag);
    next
}

/// Existing tags worth offering as free-form additions: not already on the
/// document and not part of any group vocabulary.
pub fn available_system_tags(all_tags: &TagSet, current: &TagSet, groups: &[TagGroup]) -> TagSet {
    let vocab = vocabulary(groups);
    all_tags
        .iter()
        .filter(|t| !current.contains(t) && !vocab.contains(t))
        .collect()
}
