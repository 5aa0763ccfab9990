//! Storage abstraction for doctags.
//!
//! The [`DocumentStore`] trait is the seam between the pure engine and
//! whatever holds the user's documents, taxonomy, and saved searches
//! (SQLite in the CLI, [`memory::InMemoryStore`] in tests). Stores do not
//! validate: writes that must respect the required-tag invariant go
//! through [`persist_batch`] and [`retag_document`], which run the gate
//! first and write nothing when it fails.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Document, SavedSearch, SearchQuery};
use crate::tag_set::TagSet;
use crate::taxonomy::Taxonomy;
use crate::validate::gate_batch;

/// Saved searches shown in the recent list.
pub const SAVED_SEARCH_LIMIT: usize = 10;

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_documents`](DocumentStore::list_documents) | All documents visible to the user |
/// | [`get_document`](DocumentStore::get_document) | One document by id |
/// | [`insert_documents`](DocumentStore::insert_documents) | Insert or replace a batch, unvalidated |
/// | [`update_tags`](DocumentStore::update_tags) | Replace one document's tags, unvalidated |
/// | [`load_taxonomy`](DocumentStore::load_taxonomy) / [`save_taxonomy`](DocumentStore::save_taxonomy) | Tag groups |
/// | [`list_saved_searches`](DocumentStore::list_saved_searches) | Saved searches, newest first |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Insert or replace documents by id. Use [`persist_batch`] instead
    /// of calling this directly.
    async fn insert_documents(&self, docs: &[Document]) -> Result<()>;

    /// Replace a document's tags. Returns `false` if the id is unknown.
    async fn update_tags(&self, id: &str, tags: &TagSet) -> Result<bool>;

    async fn load_taxonomy(&self) -> Result<Taxonomy>;

    async fn save_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()>;

    async fn list_saved_searches(&self) -> Result<Vec<SavedSearch>>;

    async fn save_search(&self, search: &SavedSearch) -> Result<()>;

    /// Returns `false` if the id is unknown.
    async fn delete_saved_search(&self, id: &str) -> Result<bool>;
}

/// Gate a batch against the stored taxonomy, then insert it.
///
/// On failure the error is a [`PersistError`](crate::error::PersistError)
/// (downcast it to list the missing groups) and nothing is written.
pub async fn persist_batch<S>(store: &S, docs: &[Document]) -> Result<usize>
where
    S: DocumentStore + ?Sized,
{
    let taxonomy = store.load_taxonomy().await?;
    gate_batch(docs, taxonomy.list_groups())?;
    store.insert_documents(docs).await?;
    tracing::info!(documents = docs.len(), "persisted batch");
    Ok(docs.len())
}

/// Replace a stored document's tags after re-running the gate.
pub async fn retag_document<S>(store: &S, id: &str, tags: TagSet) -> Result<Document>
where
    S: DocumentStore + ?Sized,
{
    let mut doc = store
        .get_document(id)
        .await?
        .ok_or_else(|| anyhow!("document not found: {}", id))?;
    doc.tags = tags;

    let taxonomy = store.load_taxonomy().await?;
    gate_batch(std::slice::from_ref(&doc), taxonomy.list_groups())?;

    if !store.update_tags(id, &doc.tags).await? {
        bail!("document not found: {}", id);
    }
    Ok(doc)
}

/// Store `query` under `name`.
pub async fn save_query<S>(store: &S, name: &str, query: &SearchQuery) -> Result<SavedSearch>
where
    S: DocumentStore + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        bail!("saved search name must not be blank");
    }
    let saved = SavedSearch {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        query: query.clone(),
        created_at: Utc::now(),
    };
    store.save_search(&saved).await?;
    Ok(saved)
}

/// The most recent saved searches, newest first.
pub async fn recent_saved_searches<S>(store: &S) -> Result<Vec<SavedSearch>>
where
    S: DocumentStore + ?Sized,
{
    let mut all = store.list_saved_searches().await?;
    all.truncate(SAVED_SEARCH_LIMIT);
    Ok(all)
}

/// Find a saved search by id, or by name (newest wins).
pub async fn find_saved_search<S>(store: &S, id_or_name: &str) -> Result<Option<SavedSearch>>
where
    S: DocumentStore + ?Sized,
{
    let all = store.list_saved_searches().await?;
    let by_id = all.iter().position(|s| s.id == id_or_name);
    let pos = by_id.or_else(|| all.iter().position(|s| s.name == id_or_name));
    Ok(pos.map(|i| all[i].clone()))
}
