//! Tag facets and per-document tag editing.
//!
//! `doctags tags list|suggest|browse` read the tags in use across stored
//! documents. `doctags retag` edits one document's tags and saves them
//! through the required-tag gate.

use anyhow::{Context, Result};

use doctags_core::editing::{add_freeform_tag, remove_tag, select_group_tag};
use doctags_core::error::{PersistError, TaxonomyError};
use doctags_core::facets::{all_tags, browse_tags, suggest_tags, tag_counts};
use doctags_core::store::{retag_document, DocumentStore};
use doctags_core::tag_set::TagSet;
use doctags_core::taxonomy::Taxonomy;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let documents = store.list_documents().await;
    store.close().await;

    let counts = tag_counts(&documents?);
    if counts.is_empty() {
        println!("No tags.");
        return Ok(());
    }

    println!("{:<32} {:>6}", "TAG", "DOCS");
    println!("{}", "-".repeat(39));
    for (tag, n) in counts {
        println!("{:<32} {:>6}", tag, n);
    }
    Ok(())
}

pub async fn run_suggest(config: &Config, text: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let documents = store.list_documents().await;
    store.close().await;

    for tag in suggest_tags(&all_tags(&documents?), text, config.search.suggestion_limit) {
        println!("{}", tag);
    }
    Ok(())
}

pub async fn run_browse(
    config: &Config,
    filter: Option<&str>,
    exclude: &[String],
    show_all: bool,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let documents = store.list_documents().await;
    store.close().await;

    let all = all_tags(&documents?);
    let exclude: TagSet = exclude.iter().map(String::as_str).collect();
    let limit = (!show_all).then_some(config.search.browse_limit);

    let shown = browse_tags(&all, &exclude, filter, limit);
    let available = browse_tags(&all, &exclude, filter, None).len();
    for tag in &shown {
        println!("{}", tag);
    }
    if shown.len() < available {
        println!("... {} more (use --all)", available - shown.len());
    }
    Ok(())
}

/// Apply CLI tag edits in order: group selections, additions, removals.
pub fn apply_edits(
    current: &TagSet,
    taxonomy: &Taxonomy,
    select: &[(String, String)],
    add: &[String],
    remove: &[String],
) -> Result<TagSet> {
    let mut tags = current.clone();
    for (group, tag) in select {
        let group = taxonomy
            .find(group)
            .ok_or_else(|| TaxonomyError::UnknownGroup(group.clone()))?;
        tags = select_group_tag(&tags, group, tag)?;
    }
    for tag in add {
        tags = add_freeform_tag(&tags, tag);
    }
    for tag in remove {
        tags = remove_tag(&tags, tag);
    }
    Ok(tags)
}

pub async fn run_retag(
    config: &Config,
    id: &str,
    select: &[(String, String)],
    add: &[String],
    remove: &[String],
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = retag(&store, id, select, add, remove).await;
    store.close().await;

    match result {
        Ok(tags) => {
            let shown: Vec<&str> = tags.iter().collect();
            println!("tags: {}", shown.join(", "));
            Ok(())
        }
        Err(e) => {
            if let Some(PersistError::MissingRequiredTags { failures }) = e.downcast_ref() {
                for failure in failures {
                    eprintln!("rejected: {}", failure);
                }
            }
            Err(e)
        }
    }
}

async fn retag(
    store: &SqliteStore,
    id: &str,
    select: &[(String, String)],
    add: &[String],
    remove: &[String],
) -> Result<TagSet> {
    let doc = store
        .get_document(id)
        .await?
        .with_context(|| format!("document not found: {}", id))?;
    let taxonomy = store.load_taxonomy().await?;

    let tags = apply_edits(&doc.tags, &taxonomy, select, add, remove)?;
    let updated = retag_document(store, id, tags).await?;
    tracing::info!(id, tags = updated.tags.len(), "document retagged");
    Ok(updated.tags)
}
