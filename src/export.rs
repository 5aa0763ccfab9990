//! Export the library as JSON.
//!
//! Produces one document holding every stored document, the taxonomy, and
//! the saved searches. The `documents` and taxonomy parts can be fed back
//! through `doctags import` and `doctags taxonomy import`.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use doctags_core::models::{Document, SavedSearch, TagGroup};
use doctags_core::store::DocumentStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

#[derive(Serialize)]
struct ExportData {
    documents: Vec<Document>,
    tag_groups: Vec<TagGroup>,
    saved_searches: Vec<SavedSearch>,
}

async fn collect(store: &SqliteStore) -> Result<ExportData> {
    Ok(ExportData {
        documents: store.list_documents().await?,
        tag_groups: store.load_taxonomy().await?.into_groups(),
        saved_searches: store.list_saved_searches().await?,
    })
}

/// Export documents, tag groups, and saved searches as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let data = collect(&store).await;
    store.close().await;
    let data = data?;

    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Exported {} documents, {} tag groups to {}",
                data.documents.len(),
                data.tag_groups.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
