//! `doctags taxonomy`: the tag group settings editor.
//!
//! Every editing command loads the taxonomy, applies one change, and saves
//! the whole taxonomy back. Groups are addressed by id or by name.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use doctags_core::error::TaxonomyError;
use doctags_core::models::is_group_required;
use doctags_core::store::DocumentStore;
use doctags_core::taxonomy::Taxonomy;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// One settings-editor change.
#[derive(Debug, Clone)]
pub enum TaxonomyEdit {
    AddGroup { name: String, required: bool },
    Rename { group: String, name: String },
    SetRequired { group: String, required: bool },
    RemoveGroup { group: String },
    AddTag { group: String, tag: String },
    RemoveTag { group: String, tag: String },
}

fn group_id(taxonomy: &Taxonomy, group: &str) -> Result<String, TaxonomyError> {
    taxonomy
        .find(group)
        .map(|g| g.id.clone())
        .ok_or_else(|| TaxonomyError::UnknownGroup(group.to_string()))
}

/// Apply `edit` and return a one-line summary.
pub fn apply_edit(taxonomy: &mut Taxonomy, edit: &TaxonomyEdit) -> Result<String, TaxonomyError> {
    let summary = match edit {
        TaxonomyEdit::AddGroup { name, required } => {
            let id = taxonomy.add_group(name, *required)?;
            format!("added group {} ({})", name.trim(), id)
        }
        TaxonomyEdit::Rename { group, name } => {
            let id = group_id(taxonomy, group)?;
            taxonomy.rename_group(&id, name)?;
            format!("renamed group {} to {}", id, name.trim())
        }
        TaxonomyEdit::SetRequired { group, required } => {
            let id = group_id(taxonomy, group)?;
            taxonomy.set_required(&id, *required)?;
            format!(
                "group {} is now {}",
                id,
                if *required { "required" } else { "optional" }
            )
        }
        TaxonomyEdit::RemoveGroup { group } => {
            let id = group_id(taxonomy, group)?;
            let removed = taxonomy.remove_group(&id)?;
            format!("removed group {}", removed.name)
        }
        TaxonomyEdit::AddTag { group, tag } => {
            let id = group_id(taxonomy, group)?;
            if taxonomy.add_tag(&id, tag)? {
                format!("added tag {} to {}", tag.trim(), group)
            } else {
                format!("tag {} unchanged in {}", tag.trim(), group)
            }
        }
        TaxonomyEdit::RemoveTag { group, tag } => {
            let id = group_id(taxonomy, group)?;
            if taxonomy.remove_tag(&id, tag)? {
                format!("removed tag {} from {}", tag, group)
            } else {
                format!("tag {} not in {}", tag, group)
            }
        }
    };
    Ok(summary)
}

pub async fn run_list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let taxonomy = store.load_taxonomy().await;
    store.close().await;
    let taxonomy = taxonomy?;

    if taxonomy.is_empty() {
        println!("No tag groups. Nothing is required.");
        return Ok(());
    }

    for group in taxonomy.list_groups() {
        let kind = if is_group_required(group) {
            "required"
        } else {
            "optional"
        };
        println!("{} [{}] ({})", group.name, kind, group.id);
        let tags: Vec<&str> = group.tags.iter().collect();
        if tags.is_empty() {
            println!("    (no tags)");
        } else {
            println!("    {}", tags.join(", "));
        }
    }
    Ok(())
}

pub async fn run_edit(config: &Config, edit: &TaxonomyEdit) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = edit_stored(&store, edit).await;
    store.close().await;
    println!("{}", result?);
    Ok(())
}

async fn edit_stored(store: &SqliteStore, edit: &TaxonomyEdit) -> Result<String> {
    let mut taxonomy = store.load_taxonomy().await?;
    let summary = apply_edit(&mut taxonomy, edit)?;
    store.save_taxonomy(&taxonomy).await?;
    tracing::info!(groups = taxonomy.len(), "taxonomy saved");
    Ok(summary)
}

/// Replace the taxonomy with groups read from a JSON array.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let taxonomy = Taxonomy::from_json(&value);

    let store = SqliteStore::open(config).await?;
    let result = store.save_taxonomy(&taxonomy).await;
    store.close().await;
    result?;

    println!(
        "imported tag groups: {} ({} required)",
        taxonomy.len(),
        taxonomy.required_groups().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctags_core::models::TagGroup;

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(vec![TagGroup::new("g1", "Family", ["Alice"])])
    }

    #[test]
    fn test_edits_address_groups_by_name() {
        let mut t = taxonomy();
        apply_edit(
            &mut t,
            &TaxonomyEdit::AddTag {
                group: "family".to_string(),
                tag: "Bob".to_string(),
            },
        )
        .unwrap();
        apply_edit(
            &mut t,
            &TaxonomyEdit::SetRequired {
                group: "g1".to_string(),
                required: false,
            },
        )
        .unwrap();
        let g = t.group("g1").unwrap();
        assert_eq!(g.tags.as_slice(), &["Alice", "Bob"]);
        assert!(!is_group_required(g));
    }

    #[test]
    fn test_add_and_remove_group() {
        let mut t = taxonomy();
        apply_edit(
            &mut t,
            &TaxonomyEdit::AddGroup {
                name: "Topics".to_string(),
                required: false,
            },
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        apply_edit(
            &mut t,
            &TaxonomyEdit::RemoveGroup {
                group: "Topics".to_string(),
            },
        )
        .unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_unknown_group() {
        let err = apply_edit(
            &mut taxonomy(),
            &TaxonomyEdit::Rename {
                group: "nope".to_string(),
                name: "x".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, TaxonomyError::UnknownGroup("nope".to_string()));
    }
}
