//! # doctags core
//!
//! Pure logic for doctags: tag taxonomy, the required-tag persistence gate,
//! relevance ranking, the search filter pipeline, and the tag bucket
//! reconciler used by editing views.
//!
//! This crate holds no database, filesystem, or configuration code. Storage
//! sits behind the [`store::DocumentStore`] trait; the `doctags` CLI
//! provides the SQLite implementation.

pub mod editing;
pub mod error;
pub mod facets;
pub mod models;
pub mod rank;
pub mod reconcile;
pub mod search;
pub mod store;
pub mod tag_set;
pub mod taxonomy;
pub mod upload;
pub mod validate;
