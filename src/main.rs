//! # doctags CLI
//!
//! The `doctags` binary manages a personal document library: tag groups,
//! gated imports, retagging, and search.
//!
//! ## Usage
//!
//! ```bash
//! doctags --config ./config/doctags.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `doctags init` | Create the SQLite database and run schema migrations |
//! | `doctags import <file>` | Import documents through the required-tag gate |
//! | `doctags validate <file>` | Report missing required groups without importing |
//! | `doctags search [text]` | Search with text and tag filters |
//! | `doctags get <id>` | Show a document and its tag buckets |
//! | `doctags retag <id>` | Edit a document's tags |
//! | `doctags tags ...` | Tag counts, autocomplete, and browser |
//! | `doctags taxonomy ...` | Edit tag groups |
//! | `doctags saved ...` | Saved searches |
//! | `doctags stats` | Processing status and type counts |
//! | `doctags export` | Dump everything as JSON |
//!
//! Log verbosity follows `-v`/`-q`, or the `DOCTAGS_LOG` env var
//! (`EnvFilter` syntax) when set.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use doctags::search::{parse_key_val, QueryArgs};
use doctags::taxonomy_cmd::TaxonomyEdit;
use doctags::{
    config, export, get, import, migrate, saved, search, stats, tags, taxonomy_cmd,
};

/// doctags: tag taxonomy and search for your documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "doctags",
    about = "doctags: tag taxonomy and search for your documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/doctags.toml`.
    #[arg(long, global = true, default_value = "./config/doctags.toml")]
    config: PathBuf,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents, tag_groups, and
    /// saved_searches tables. Running it again is safe.
    Init,

    /// Import documents from a JSON file.
    ///
    /// Assigns ids, document numbers, and timestamps where missing, checks
    /// for duplicates, and writes the batch only if every document has a
    /// tag from each required group.
    Import {
        /// JSON file: an array of documents or `{"documents": [...]}`.
        file: PathBuf,

        /// Report what would happen without writing.
        #[arg(long)]
        dry_run: bool,

        /// Import even if files match stored documents.
        #[arg(long)]
        allow_duplicates: bool,
    },

    /// Check documents against the required tag groups.
    Validate {
        /// JSON file in the same format as `import`.
        file: PathBuf,
    },

    /// Search stored documents.
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Maximum number of results. Defaults to `[search].final_limit`.
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,

        /// Show the relevance score breakdown.
        #[arg(long)]
        explain: bool,
    },

    /// Show a document by id.
    Get {
        /// Document id.
        id: String,
    },

    /// Edit a document's tags. The result must still satisfy every
    /// required group.
    Retag {
        /// Document id.
        id: String,

        /// Select a group tag as `GROUP=TAG`, replacing the group's current
        /// tag. Selecting the current tag again clears it.
        #[arg(long = "select", value_parser = parse_key_val)]
        select: Vec<(String, String)>,

        /// Add a free-form tag.
        #[arg(long)]
        add: Vec<String>,

        /// Remove a tag.
        #[arg(long)]
        remove: Vec<String>,
    },

    /// Inspect tags in use.
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },

    /// Edit tag groups.
    Taxonomy {
        #[command(subcommand)]
        action: TaxonomyAction,
    },

    /// Manage saved searches.
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Show document counts by processing status and type.
    Stats {
        /// Only count documents of this type (`all` for every type).
        #[arg(long = "type")]
        doc_type: Option<String>,
    },

    /// Export documents, tag groups, and saved searches as JSON.
    Export {
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TagsAction {
    /// Every tag with its document count.
    List,
    /// Autocomplete: tags containing TEXT.
    Suggest { text: String },
    /// Browse tags, a page at a time.
    Browse {
        /// Only tags containing this text.
        #[arg(long)]
        filter: Option<String>,
        /// Hide this tag. Repeatable.
        #[arg(long)]
        exclude: Vec<String>,
        /// Show every matching tag.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum TaxonomyAction {
    /// List tag groups and their tags.
    List,
    /// Add an empty tag group.
    AddGroup {
        name: String,
        /// Create the group as optional.
        #[arg(long)]
        optional: bool,
    },
    /// Rename a group.
    Rename { group: String, name: String },
    /// Mark a group required (`true`) or optional (`false`).
    SetRequired {
        group: String,
        #[arg(action = ArgAction::Set)]
        required: bool,
    },
    /// Delete a group.
    RemoveGroup { group: String },
    /// Add a tag to a group.
    AddTag { group: String, tag: String },
    /// Remove a tag from a group.
    RemoveTag { group: String, tag: String },
    /// Replace all groups with those in a JSON array.
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum SavedAction {
    /// The ten most recent saved searches.
    List,
    /// Save a search under a name.
    Save {
        name: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Run a saved search.
    Run {
        /// Saved search name or id.
        name: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved search.
    Delete {
        /// Saved search name or id.
        name: String,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCTAGS_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn taxonomy_edit(action: TaxonomyAction) -> Option<TaxonomyEdit> {
    Some(match action {
        TaxonomyAction::AddGroup { name, optional } => TaxonomyEdit::AddGroup {
            name,
            required: !optional,
        },
        TaxonomyAction::Rename { group, name } => TaxonomyEdit::Rename { group, name },
        TaxonomyAction::SetRequired { group, required } => {
            TaxonomyEdit::SetRequired { group, required }
        }
        TaxonomyAction::RemoveGroup { group } => TaxonomyEdit::RemoveGroup { group },
        TaxonomyAction::AddTag { group, tag } => TaxonomyEdit::AddTag { group, tag },
        TaxonomyAction::RemoveTag { group, tag } => TaxonomyEdit::RemoveTag { group, tag },
        TaxonomyAction::List | TaxonomyAction::Import { .. } => return None,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import {
            file,
            dry_run,
            allow_duplicates,
        } => {
            import::run_import(&cfg, &file, dry_run, allow_duplicates).await?;
        }
        Commands::Validate { file } => {
            import::run_validate(&cfg, &file).await?;
        }
        Commands::Search {
            query,
            limit,
            json,
            explain,
        } => {
            search::run_search_cmd(&cfg, &query, limit, json, explain).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Retag {
            id,
            select,
            add,
            remove,
        } => {
            tags::run_retag(&cfg, &id, &select, &add, &remove).await?;
        }
        Commands::Tags { action } => match action {
            TagsAction::List => tags::run_list(&cfg).await?,
            TagsAction::Suggest { text } => tags::run_suggest(&cfg, &text).await?,
            TagsAction::Browse {
                filter,
                exclude,
                all,
            } => tags::run_browse(&cfg, filter.as_deref(), &exclude, all).await?,
        },
        Commands::Taxonomy { action } => match action {
            TaxonomyAction::List => taxonomy_cmd::run_list(&cfg).await?,
            TaxonomyAction::Import { file } => taxonomy_cmd::run_import(&cfg, &file).await?,
            edit => {
                if let Some(edit) = taxonomy_edit(edit) {
                    taxonomy_cmd::run_edit(&cfg, &edit).await?;
                }
            }
        },
        Commands::Saved { action } => match action {
            SavedAction::List => saved::run_list(&cfg).await?,
            SavedAction::Save { name, query } => saved::run_save(&cfg, &name, &query).await?,
            SavedAction::Run { name, limit, json } => {
                saved::run_saved(&cfg, &name, limit, json).await?
            }
            SavedAction::Delete { name } => saved::run_delete(&cfg, &name).await?,
        },
        Commands::Stats { doc_type } => {
            stats::run_stats(&cfg, doc_type.as_deref()).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
    }

    Ok(())
}
