//! Derived relation graph cache
//!
//! Building the relation graph of a version is expensive and is done by an
//! external [`RelationGraphEngine`]. When a new version leaves terms, roots
//! and inhibitions untouched (only translations, diff or history changed) the
//! previous graph is cloned and re-pointed at the new version instead.
//!
//! Graphs are persisted as checksummed artifacts named
//! `cache_<version name>.pk1`, written atomically.

mod artifact;
mod graph;
mod manager;

pub use artifact::{decode as decode_artifact, encode as encode_artifact, ARTIFACT_FORMAT_VERSION};
pub use graph::{CoherenceError, RelationGraph, RelationGraphEngine};
pub use manager::{CacheManager, GraphDerivation};
