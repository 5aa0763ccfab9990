use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Create documents table. Tag columns hold JSON string arrays;
    // created_at is Unix milliseconds.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            title TEXT,
            organization TEXT,
            extracted_text TEXT,
            document_number TEXT,
            document_type TEXT,
            original_filename TEXT,
            processing_status TEXT,
            tags_json TEXT NOT NULL DEFAULT '[]',
            ai_suggested_tags_json TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tag_groups table. NULL is_required means required.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tag_groups (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            is_required INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create saved_searches table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_searches (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            query_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(document_type)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_saved_searches_created_at ON saved_searches(created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("schema applied");
    Ok(())
}
