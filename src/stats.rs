//! Library statistics: processing status counts and per-type breakdown.
//!
//! Used by `doctags stats`. With `--type` the counts cover only documents
//! of that type, the same narrowing as the quick filters.

use anyhow::Result;

use doctags_core::facets::{filter_by_type, type_counts, DocumentStats};
use doctags_core::models::Document;
use doctags_core::store::DocumentStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: load documents and print a summary.
pub async fn run_stats(config: &Config, doc_type: Option<&str>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let documents = store.list_documents().await;
    let taxonomy = store.load_taxonomy().await;
    store.close().await;
    let documents = documents?;
    let taxonomy = taxonomy?;

    let selected: Vec<Document> = match doc_type {
        Some(t) => filter_by_type(&documents, t).into_iter().cloned().collect(),
        None => documents,
    };
    let stats = DocumentStats::compute(&selected);

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("doctags stats");
    println!("=============");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Tag groups:  {} ({} required)", taxonomy.len(), taxonomy.required_groups().len());
    println!();
    if let Some(t) = doc_type {
        println!("  Type:        {}", t);
    }
    println!("  Documents:   {}", stats.total);
    println!("  Processed:   {}", stats.processed);
    println!("  Processing:  {}", stats.processing);
    println!("  Error:       {}", stats.error);

    let by_type = type_counts(&selected);
    if !by_type.is_empty() {
        println!();
        println!("  By type:");
        println!("  {:<24} {:>6}", "TYPE", "DOCS");
        println!("  {}", "-".repeat(31));
        for (t, n) in &by_type {
            println!("  {:<24} {:>6}", t, n);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
