//! Term migration across versions
//!
//! Translates a term valid in an old version into its current equivalent by
//! composing the per-version rename/removal diffs in chronological order.
//! Results are memoized in a small LRU cache.

mod resolver;

pub use resolver::{DiffResolver, TermMapping, MIGRATION_CACHE_CAPACITY};
