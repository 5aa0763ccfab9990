//! `doctags import` and `doctags validate`: the upload preview flow.
//!
//! Input is a JSON file holding either an array of documents or an object
//! with a `documents` array. Field names from older exports (camelCase,
//! `created_date`, integer ids) are accepted.
//!
//! Import steps:
//!
//! 1. Parse documents leniently, skipping entries that are not objects.
//! 2. Fill upload-assigned fields (id, document number, timestamp, title).
//! 3. Reject files that duplicate stored documents, unless allowed.
//! 4. Run the required-tag gate over the whole batch. If any document
//!    fails, nothing is written.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::path::Path;

use doctags_core::error::PersistError;
use doctags_core::models::Document;
use doctags_core::store::{persist_batch, DocumentStore};
use doctags_core::upload::{find_duplicates, prepare_preview, DuplicateMatch};
use doctags_core::validate::{check_batch, missing_required_groups};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Parse a documents file.
pub fn parse_documents(content: &str) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("documents") {
            Some(Value::Array(items)) => items,
            _ => bail!("expected a JSON array or an object with a \"documents\" array"),
        },
        _ => bail!("expected a JSON array or an object with a \"documents\" array"),
    };

    let mut docs = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index = i, "skipping non-object document entry");
            continue;
        }
        match serde_json::from_value::<Document>(item) {
            Ok(doc) => docs.push(doc),
            Err(e) => tracing::warn!(index = i, error = %e, "skipping malformed document"),
        }
    }
    Ok(docs)
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_documents(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Name used for duplicate detection: the original file name, else the
/// title.
fn upload_name(doc: &Document) -> &str {
    doc.original_filename
        .as_deref()
        .unwrap_or_else(|| doc.display_title())
}

fn print_failures(err: &anyhow::Error) {
    if let Some(PersistError::MissingRequiredTags { failures }) = err.downcast_ref() {
        eprintln!("Missing required tags:");
        for failure in failures {
            eprintln!("  {}", failure);
        }
    }
}

fn print_duplicates(dups: &[DuplicateMatch]) {
    eprintln!("Duplicates of stored documents:");
    for d in dups {
        eprintln!(
            "  {} matches \"{}\" ({})",
            d.file_name, d.existing_title, d.existing_id
        );
    }
}

pub async fn run_import(
    config: &Config,
    path: &Path,
    dry_run: bool,
    allow_duplicates: bool,
) -> Result<()> {
    let mut docs = read_documents(path)?;
    if docs.is_empty() {
        println!("No documents found in {}", path.display());
        return Ok(());
    }

    let now = Utc::now();
    for doc in &mut docs {
        prepare_preview(doc, now);
    }

    let store = SqliteStore::open(config).await?;
    let result = import_batch(config, &store, &docs, dry_run, allow_duplicates).await;
    store.close().await;
    result
}

async fn import_batch(
    config: &Config,
    store: &SqliteStore,
    docs: &[Document],
    dry_run: bool,
    allow_duplicates: bool,
) -> Result<()> {
    if config.upload.check_duplicates && !allow_duplicates {
        let existing = store.list_documents().await?;
        let dups = find_duplicates(docs.iter().map(upload_name), &existing);
        if !dups.is_empty() {
            print_duplicates(&dups);
            bail!(
                "{} duplicate document(s); pass --allow-duplicates to import anyway",
                dups.len()
            );
        }
    }

    if dry_run {
        let taxonomy = store.load_taxonomy().await?;
        let failures = check_batch(docs, taxonomy.list_groups());
        println!("dry run: {} document(s) read", docs.len());
        println!("  would fail validation: {}", failures.len());
        for failure in &failures {
            println!("  {}", failure);
        }
        return Ok(());
    }

    match persist_batch(store, docs).await {
        Ok(n) => {
            println!("imported documents: {}", n);
            Ok(())
        }
        Err(e) => {
            print_failures(&e);
            tracing::warn!("batch rejected, nothing imported");
            Err(e)
        }
    }
}

/// Report missing required groups for each document in a file. Fails if
/// any document would be rejected.
pub async fn run_validate(config: &Config, path: &Path) -> Result<()> {
    let docs = read_documents(path)?;

    let store = SqliteStore::open(config).await?;
    let taxonomy = store.load_taxonomy().await;
    store.close().await;
    let taxonomy = taxonomy?;

    let mut failed = 0;
    for doc in &docs {
        let missing = missing_required_groups(&doc.tags, taxonomy.list_groups());
        if missing.is_empty() {
            println!("ok    {}", doc.display_title());
        } else {
            failed += 1;
            let names: Vec<&str> = missing.iter().map(|g| g.name.as_str()).collect();
            println!("FAIL  {} (missing: {})", doc.display_title(), names.join(", "));
        }
    }

    if failed > 0 {
        bail!("{} of {} document(s) missing required tags", failed, docs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_and_wrapped_forms() {
        let docs = parse_documents(r#"[{"id": 1, "title": "A"}, 5, {"title": "B"}]"#).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "1");

        let wrapped = parse_documents(r#"{"documents": [{"title": "C", "tags": "Tax"}]}"#).unwrap();
        assert_eq!(wrapped[0].tags.as_slice(), &["Tax"]);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_documents("42").is_err());
        assert!(parse_documents(r#"{"docs": []}"#).is_err());
        assert!(parse_documents("not json").is_err());
    }

    #[test]
    fn test_upload_name_prefers_filename() {
        let doc = Document {
            id: "1".to_string(),
            title: Some("Lease".to_string()),
            original_filename: Some("lease.pdf".to_string()),
            ..Default::default()
        };
        assert_eq!(upload_name(&doc), "lease.pdf");
        let untitled = Document {
            id: "2".to_string(),
            ..Default::default()
        };
        assert_eq!(upload_name(&untitled), "2");
    }
}
