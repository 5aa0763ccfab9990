//! SQLite-backed [`DocumentStore`] implementation.
//!
//! Documents, tag groups, and saved searches live in three tables (see
//! [`migrate`](crate::migrate)). Tag sets are stored as JSON string arrays
//! and read back leniently, so a hand-edited row with a bad tag column
//! loads with no tags instead of failing the whole listing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use doctags_core::models::{Document, SavedSearch, SearchQuery, TagGroup};
use doctags_core::store::DocumentStore;
use doctags_core::tag_set::TagSet;
use doctags_core::taxonomy::Taxonomy;

use crate::config::Config;
use crate::db;

/// SQLite implementation of the [`DocumentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database. Run `doctags init` first.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn tags_from_column(json: &str) -> TagSet {
    serde_json::from_str::<Value>(json)
        .map(|v| TagSet::from_json(&v))
        .unwrap_or_default()
}

fn row_to_document(row: &SqliteRow) -> Document {
    let tags_json: String = row.get("tags_json");
    let ai_json: String = row.get("ai_suggested_tags_json");
    let created_at: Option<i64> = row.get("created_at");

    Document {
        id: row.get("id"),
        title: row.get("title"),
        organization: row.get("organization"),
        extracted_text: row.get("extracted_text"),
        document_number: row.get("document_number"),
        document_type: row.get("document_type"),
        original_filename: row.get("original_filename"),
        processing_status: row.get("processing_status"),
        tags: tags_from_column(&tags_json),
        ai_suggested_tags: tags_from_column(&ai_json),
        created_at: created_at.and_then(DateTime::from_timestamp_millis),
    }
}

const DOCUMENT_COLUMNS: &str = "id, title, organization, extracted_text, document_number, \
     document_type, original_filename, processing_status, tags_json, \
     ai_suggested_tags_json, created_at";

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents ORDER BY rowid",
            DOCUMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_document))
    }

    async fn insert_documents(&self, docs: &[Document]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for doc in docs {
            sqlx::query(
                r#"
                INSERT INTO documents (id, title, organization, extracted_text,
                                       document_number, document_type, original_filename,
                                       processing_status, tags_json, ai_suggested_tags_json,
                                       created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    organization = excluded.organization,
                    extracted_text = excluded.extracted_text,
                    document_number = excluded.document_number,
                    document_type = excluded.document_type,
                    original_filename = excluded.original_filename,
                    processing_status = excluded.processing_status,
                    tags_json = excluded.tags_json,
                    ai_suggested_tags_json = excluded.ai_suggested_tags_json,
                    created_at = excluded.created_at
                "#,
            )
            .bind(&doc.id)
            .bind(&doc.title)
            .bind(&doc.organization)
            .bind(&doc.extracted_text)
            .bind(&doc.document_number)
            .bind(&doc.document_type)
            .bind(&doc.original_filename)
            .bind(&doc.processing_status)
            .bind(serde_json::to_string(&doc.tags)?)
            .bind(serde_json::to_string(&doc.ai_suggested_tags)?)
            .bind(doc.created_at.map(|t| t.timestamp_millis()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_tags(&self, id: &str, tags: &TagSet) -> Result<bool> {
        let result = sqlx::query("UPDATE documents SET tags_json = ? WHERE id = ?")
            .bind(serde_json::to_string(tags)?)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load_taxonomy(&self) -> Result<Taxonomy> {
        let rows = sqlx::query(
            "SELECT id, name, tags_json, is_required FROM tag_groups ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let groups = rows
            .iter()
            .map(|row| {
                let tags_json: String = row.get("tags_json");
                TagGroup {
                    id: row.get("id"),
                    name: row.get("name"),
                    tags: tags_from_column(&tags_json),
                    is_required: row.get("is_required"),
                }
            })
            .collect();

        Ok(Taxonomy::new(groups))
    }

    async fn save_taxonomy(&self, taxonomy: &Taxonomy) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tag_groups")
            .execute(&mut *tx)
            .await?;

        for (position, group) in taxonomy.list_groups().iter().enumerate() {
            sqlx::query(
                "INSERT INTO tag_groups (id, position, name, tags_json, is_required) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&group.id)
            .bind(position as i64)
            .bind(&group.name)
            .bind(serde_json::to_string(&group.tags)?)
            .bind(group.is_required)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_saved_searches(&self) -> Result<Vec<SavedSearch>> {
        let rows = sqlx::query(
            "SELECT id, name, query_json, created_at FROM saved_searches \
             ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let query_json: String = row.get("query_json");
                let created_at: i64 = row.get("created_at");
                let query: SearchQuery = serde_json::from_str(&query_json)
                    .with_context(|| format!("Corrupt saved search query: {}", id))?;
                Ok(SavedSearch {
                    id,
                    name: row.get("name"),
                    query,
                    created_at: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                })
            })
            .collect()
    }

    async fn save_search(&self, search: &SavedSearch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_searches (id, name, query_json, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                query_json = excluded.query_json,
                created_at = excluded.created_at
            "#,
        )
        .bind(&search.id)
        .bind(&search.name)
        .bind(serde_json::to_string(&search.query)?)
        .bind(search.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_saved_search(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
