//! Document retrieval by id.
//!
//! Prints a stored document with its tags split into the same buckets the
//! editing views use, plus its required-tag status.

use anyhow::{anyhow, Result};

use doctags_core::editing::available_system_tags;
use doctags_core::facets::all_tags;
use doctags_core::reconcile::{reconcile, GroupTags};
use doctags_core::store::DocumentStore;
use doctags_core::tag_set::TagSet;
use doctags_core::validate::missing_required_groups;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

fn join(tags: &TagSet) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.iter().collect::<Vec<_>>().join(", ")
}

fn print_group(group: &GroupTags) {
    println!("  {:<20} {}", group.group_name, join(&group.selected));
    if !group.suggested.is_empty() {
        println!("  {:<20} suggested: {}", "", join(&group.suggested));
    }
}

/// CLI entry point: fetch a document and print it to stdout.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let doc = store.get_document(id).await;
    let documents = store.list_documents().await;
    let taxonomy = store.load_taxonomy().await;
    store.close().await;

    let doc = doc?.ok_or_else(|| anyhow!("document not found: {}", id))?;
    let documents = documents?;
    let taxonomy = taxonomy?;
    let groups = taxonomy.list_groups();

    println!("--- Document ---");
    println!("id:              {}", doc.id);
    println!(
        "title:           {}",
        doc.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(ref org) = doc.organization {
        println!("organization:    {}", org);
    }
    if let Some(ref number) = doc.document_number {
        println!("document_number: {}", number);
    }
    if let Some(ref doc_type) = doc.document_type {
        println!("document_type:   {}", doc_type);
    }
    if let Some(ref file) = doc.original_filename {
        println!("filename:        {}", file);
    }
    if let Some(ref status) = doc.processing_status {
        println!("status:          {}", status);
    }
    if let Some(created) = doc.created_at {
        println!("created_at:      {}", created.format("%Y-%m-%dT%H:%M:%SZ"));
    }
    println!();

    let buckets = reconcile(&doc.tags, &doc.ai_suggested_tags, groups);

    println!("--- Required groups ---");
    for group in &buckets.required_group_tags {
        print_group(group);
    }
    if !buckets.optional_group_tags.is_empty() {
        println!("--- Optional groups ---");
        for group in &buckets.optional_group_tags {
            print_group(group);
        }
    }
    println!("--- Other tags ---");
    println!("  {}", join(&buckets.freeform_tags));
    if !buckets.available_suggestions.is_empty() {
        println!("  suggested: {}", join(&buckets.available_suggestions));
    }
    let in_use = available_system_tags(&all_tags(&documents), &doc.tags, groups);
    if !in_use.is_empty() {
        println!("  in use elsewhere: {}", join(&in_use));
    }
    println!();

    let missing = missing_required_groups(&doc.tags, groups);
    if missing.is_empty() {
        println!("required tags: ok");
    } else {
        let names: Vec<&str> = missing.iter().map(|g| g.name.as_str()).collect();
        println!("required tags: missing {}", names.join(", "));
    }

    Ok(())
}
