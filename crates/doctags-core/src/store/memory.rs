//! In-memory [`DocumentStore`] implementation for tests and embedding.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Documents keep insertion order;
//! re-inserting an id replaces the document in place.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Document, SavedSearch};
use crate::tag_set::TagSet;
use crate::taxonomy::Taxonomy;

use super::DocumentStore;

#[derive(Default)]
pub struct InMemoryStore {
    docs: RwLock<Vec<Document>>,
    taxonomy: RwLock<Taxonomy>,
    searches: RwLock<Vec<SavedSearch>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a taxonomy.
    pub fn with_taxonomy(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy: RwLock::new(taxonomy),
            ..Default::default()
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(read(&self.docs)?.clone())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(read(&self.docs)?.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_documents(&self, docs: &[Document]) -> Result<()> {
        let mut stored = write(&self.docs)?;
        for doc in docs {
            match stored.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc.clone(),
                None => stored.push(doc.clone()),
            }
        }
        Ok(())
    }

    async fn update_tags(&self, id: &str, tags: &TagSet) -> Result<bool> {
        let mut stored = write(&self.docs)?;
        match stored.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.tags = tags.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn load_taxonomy(&self) -> Result<Taxonomy> {
        Ok(read(&self.taxonomy)?.clone())
    }

    async fn save_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()> {
        *write(&self.taxonomy)? = taxonomy.clone();
        Ok(())
    }

    async fn list_saved_searches(&self) -> Result<Vec<SavedSearch>> {
        let mut all = read(&self.searches)?.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn save_search(&self, search: &SavedSearch) -> Result<()> {
        let mut stored = write(&self.searches)?;
        stored.retain(|s| s.id != search.id);
        stored.push(search.clone());
        Ok(())
    }

    async fn delete_saved_search(&self, id: &str) -> Result<bool> {
        let mut stored = write(&self.searches)?;
        let before = stored.len();
        stored.retain(|s| s.id != id);
        Ok(stored.len() != before)
    }
}
