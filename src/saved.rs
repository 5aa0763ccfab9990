//! `doctags saved`: named searches that rerun through the same pipeline.

use anyhow::{anyhow, Result};

use doctags_core::models::SavedSearch;
use doctags_core::store::{find_saved_search, recent_saved_searches, save_query, DocumentStore};

use crate::config::Config;
use crate::search::{build_query, execute, OutputOptions, QueryArgs};
use crate::sqlite_store::SqliteStore;

pub async fn run_list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let searches = recent_saved_searches(&store).await;
    store.close().await;
    let searches = searches?;

    if searches.is_empty() {
        println!("No saved searches.");
        return Ok(());
    }
    for s in &searches {
        println!(
            "{}  {}  ({} filter(s), sort {} {})",
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.name,
            s.query.active_filter_count(),
            s.query.sort_key,
            s.query.sort_order
        );
    }
    Ok(())
}

async fn lookup(store: &SqliteStore, name: &str) -> Result<SavedSearch> {
    find_saved_search(store, name)
        .await?
        .ok_or_else(|| anyhow!("saved search not found: {}", name))
}

async fn save(store: &SqliteStore, config: &Config, name: &str, args: &QueryArgs) -> Result<SavedSearch> {
    let taxonomy = store.load_taxonomy().await?;
    let query = build_query(config, args, &taxonomy)?;
    save_query(store, name, &query).await
}

pub async fn run_save(config: &Config, name: &str, args: &QueryArgs) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = save(&store, config, name, args).await;
    store.close().await;

    let saved = result?;
    println!("saved search {} ({})", saved.name, saved.id);
    Ok(())
}

async fn rerun(store: &SqliteStore, name: &str, opts: OutputOptions) -> Result<()> {
    let saved = lookup(store, name).await?;
    tracing::debug!(name = %saved.name, "running saved search");
    execute(store, &saved.query, opts).await
}

pub async fn run_saved(config: &Config, name: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let opts = OutputOptions {
        limit: limit.unwrap_or(config.search.final_limit),
        json,
        explain: false,
    };
    let store = SqliteStore::open(config).await?;
    let result = rerun(&store, name, opts).await;
    store.close().await;
    result
}

async fn delete(store: &SqliteStore, name: &str) -> Result<SavedSearch> {
    let saved = lookup(store, name).await?;
    store.delete_saved_search(&saved.id).await?;
    Ok(saved)
}

pub async fn run_delete(config: &Config, name: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = delete(&store, name).await;
    store.close().await;

    let saved = result?;
    println!("deleted saved search {}", saved.name);
    Ok(())
}
