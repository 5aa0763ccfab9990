//! # doctags
//!
//! A local-first document tag taxonomy and search engine.
//!
//! Users define tag groups (some required, some optional), tag their
//! documents, and search them with free text plus tag filters. Every save
//! passes a required-tag gate: a batch is written only if each document
//! carries at least one tag from every required group.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────┐
//! │ CLI          │──▶│ doctags-core      │──▶│  SQLite   │
//! │ (doctags)    │   │ gate/rank/search  │   │  store    │
//! └──────────────┘   └───────────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! doctags init
//! doctags taxonomy add-group Family
//! doctags taxonomy add-tag Family Alice
//! doctags import ./scans.json
//! doctags search invoice --tag Family=Alice --sort date
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `DocumentStore` |
//! | [`import`] | Upload preview, duplicate check, gated import |
//! | [`search`] | Search command and query building |
//! | [`get`] | Document detail with tag buckets |
//! | [`tags`] | Tag facets and retagging |
//! | [`taxonomy_cmd`] | Tag group editor |
//! | [`saved`] | Saved searches |
//! | [`stats`] | Library statistics |
//! | [`export`] | JSON export |

pub mod config;
pub mod db;
pub mod export;
pub mod get;
pub mod import;
pub mod migrate;
pub mod saved;
pub mod search;
pub mod sqlite_store;
pub mod stats;
pub mod tags;
pub mod taxonomy_cmd;
