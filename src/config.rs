//! TOML configuration for the `doctags` CLI.
//!
//! ```toml
//! [db]
//! path = "./data/doctags.sqlite"
//!
//! [search]
//! default_sort = "relevance"
//! default_order = "desc"
//! final_limit = 50
//!
//! [upload]
//! check_duplicates = true
//! ```
//!
//! Only `[db]` is mandatory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use doctags_core::facets::{DEFAULT_BROWSE_LIMIT, DEFAULT_SUGGESTION_LIMIT};
use doctags_core::models::{SortKey, SortOrder};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_sort")]
    pub default_sort: String,
    #[serde(default = "default_order")]
    pub default_order: String,
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_browse_limit")]
    pub browse_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
            default_order: default_order(),
            final_limit: default_final_limit(),
            suggestion_limit: default_suggestion_limit(),
            browse_limit: default_browse_limit(),
        }
    }
}

impl SearchConfig {
    pub fn sort_key(&self) -> Result<SortKey> {
        self.default_sort.parse()
    }

    pub fn sort_order(&self) -> Result<SortOrder> {
        self.default_order.parse()
    }
}

fn default_sort() -> String {
    "relevance".to_string()
}
fn default_order() -> String {
    "desc".to_string()
}
fn default_final_limit() -> usize {
    50
}
fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}
fn default_browse_limit() -> usize {
    DEFAULT_BROWSE_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_check_duplicates")]
    pub check_duplicates: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            check_duplicates: default_check_duplicates(),
        }
    }
}

fn default_check_duplicates() -> bool {
    true
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate search
    config
        .search
        .sort_key()
        .context("search.default_sort is invalid")?;
    config
        .search
        .sort_order()
        .context("search.default_order is invalid")?;

    if config.search.final_limit == 0 {
        anyhow::bail!("search.final_limit must be >= 1");
    }
    if config.search.suggestion_limit == 0 {
        anyhow::bail!("search.suggestion_limit must be >= 1");
    }
    if config.search.browse_limit == 0 {
        anyhow::bail!("search.browse_limit must be >= 1");
    }

    Ok(config)
}
