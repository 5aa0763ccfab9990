//! `doctags search`: run the filter pipeline over stored documents.
//!
//! The pipeline itself lives in [`doctags_core::search`]. This module turns
//! CLI arguments into a [`SearchQuery`], loads the user's documents and
//! taxonomy from SQLite, and prints the hits.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use doctags_core::models::{SearchQuery, SortKey, SortOrder};
use doctags_core::rank::{self, ScoreExplanation};
use doctags_core::search::{run_search, SearchHit, SearchStats};
use doctags_core::store::DocumentStore;
use doctags_core::taxonomy::Taxonomy;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Query arguments shared by `search` and `saved save`.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Free text matched against title, organization, extracted text,
    /// document number, and tags.
    pub text: Option<String>,

    /// Required selection as `GROUP=TAG` (group id or name). Repeatable;
    /// every selection must match.
    #[arg(long = "tag", value_parser = parse_key_val)]
    pub tags: Vec<(String, String)>,

    /// Optional tag. Repeatable; a document needs any one of them.
    #[arg(long = "any")]
    pub any: Vec<String>,

    /// Sort key: `relevance`, `date`, or `title`. Defaults to
    /// `[search].default_sort`.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort order: `asc` or `desc`. Defaults to `[search].default_order`.
    #[arg(long)]
    pub order: Option<String>,
}

/// Parse a `key=value` pair for `--tag` arguments.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Resolve a group given by id or name to its id. Unknown groups are
/// passed through as ids; the pipeline still filters on the tag.
pub fn resolve_group_id(taxonomy: &Taxonomy, group: &str) -> String {
    match taxonomy.find(group) {
        Some(g) => g.id.clone(),
        None => {
            tracing::warn!(group, "tag group not found in taxonomy");
            group.to_string()
        }
    }
}

/// Build a [`SearchQuery`] from CLI arguments and config defaults.
pub fn build_query(config: &Config, args: &QueryArgs, taxonomy: &Taxonomy) -> Result<SearchQuery> {
    let sort_key: SortKey = match &args.sort {
        Some(s) => s.parse()?,
        None => config.search.sort_key()?,
    };
    let sort_order: SortOrder = match &args.order {
        Some(s) => s.parse()?,
        None => config.search.sort_order()?,
    };

    let mut query = SearchQuery {
        text: args.text.clone().unwrap_or_default(),
        sort_key,
        sort_order,
        ..Default::default()
    };
    for (group, tag) in &args.tags {
        let group_id = resolve_group_id(taxonomy, group);
        query.required_selections.insert(group_id, tag.clone());
    }
    query.optional_selections.extend(args.any.iter().map(String::as_str));
    Ok(query)
}

#[derive(Serialize)]
struct JsonHit<'a> {
    #[serde(flatten)]
    hit: SearchHit<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<ScoreExplanation>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    stats: SearchStats,
    hits: Vec<JsonHit<'a>>,
}

/// Output switches for a result listing.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub limit: usize,
    pub json: bool,
    pub explain: bool,
}

/// Run `query` against the store and print the results.
pub async fn execute(store: &SqliteStore, query: &SearchQuery, opts: OutputOptions) -> Result<()> {
    let documents = store.list_documents().await?;
    let taxonomy = store.load_taxonomy().await?;

    let mut outcome = run_search(&documents, query, taxonomy.list_groups());
    outcome.hits.truncate(opts.limit);

    if opts.json {
        let hits = outcome
            .hits
            .into_iter()
            .map(|hit| JsonHit {
                explanation: opts.explain.then(|| rank::explain(hit.document, query)),
                hit,
            })
            .collect();
        let out = JsonOutput {
            stats: outcome.stats,
            hits,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let stats = outcome.stats;
    if outcome.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "Showing {} of {} matching ({} total, {} ms)",
        outcome.hits.len(),
        stats.filtered,
        stats.total,
        stats.elapsed.as_millis()
    );
    println!();

    for (i, hit) in outcome.hits.iter().enumerate() {
        let doc = hit.document;
        match hit.score {
            Some(score) => println!("{}. [{}] {}", i + 1, score, doc.display_title()),
            None => println!("{}. {}", i + 1, doc.display_title()),
        }
        if let Some(date) = doc.created_at {
            println!("    created: {}", date.format("%Y-%m-%d"));
        }
        if let Some(org) = doc.organization.as_deref() {
            println!("    organization: {}", org);
        }
        if !doc.tags.is_empty() {
            let tags: Vec<&str> = doc.tags.iter().collect();
            println!("    tags: {}", tags.join(", "));
        }
        if opts.explain {
            let e = rank::explain(doc, query);
            println!(
                "    score: required={} optional={} title={} org={} tag_text={} extracted={} total={}",
                e.required_matches,
                e.optional_matches,
                e.title_match,
                e.organization_match,
                e.tag_text_match,
                e.extracted_text_match,
                e.total
            );
        }
        println!("    id: {}", doc.id);
        println!();
    }

    Ok(())
}

/// CLI entry point for `doctags search`.
pub async fn run_search_cmd(
    config: &Config,
    args: &QueryArgs,
    limit: Option<usize>,
    json: bool,
    explain: bool,
) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let taxonomy = store.load_taxonomy().await?;
    let query = build_query(config, args, &taxonomy)?;
    tracing::debug!(filters = query.active_filter_count(), "running search");

    let opts = OutputOptions {
        limit: limit.unwrap_or(config.search.final_limit),
        json,
        explain,
    };
    let result = execute(&store, &query, opts).await;
    store.close().await;
    result
}
