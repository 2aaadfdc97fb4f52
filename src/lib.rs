//! lexicon - versioned snapshots of a structured symbolic dictionary
//!
//! Each dictionary version is an immutable snapshot identified by its UTC
//! creation timestamp. Versions are fetched from a remote source and cached
//! locally, new versions are derived from old ones by explicit edits, and
//! terms are migrated across versions by composing per-version diffs.

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diff;
pub mod errors;
pub mod observability;
pub mod phonetic;
pub mod store;
pub mod version;

pub use catalog::Catalog;
pub use config::Config;
pub use errors::{LexiconError, LexiconResult};
