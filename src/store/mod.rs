//! Snapshot storage subsystem
//!
//! A snapshot is the materialized content of one dictionary version:
//! terms, root paradigms, inhibition rules, translations, the rename/removal
//! diff against earlier versions and the per-version edit history.
//!
//! # Layout
//!
//! One JSON document per version in the local versions directory, named
//! after the platform-safe version name. Missing documents are fetched from
//! the configured remote and cached locally before parsing.
//!
//! # Durability
//!
//! Every write to the versions directory is atomic (temp file, fsync,
//! rename). The directory may be shared by several processes; none of them
//! can observe a partially written file.

mod atomic;
mod document;
mod remote;
mod snapshot;
mod version_store;

pub use atomic::{discard, write_atomic};
pub use document::SnapshotDocument;
pub use remote::{parse_bucket_listing, remote_from_location, DirectoryRemote, HttpRemote, RemoteSource};
pub use snapshot::{Diff, History, HistoryEvent, Inhibitions, Snapshot, TermSet, Translations};
pub use version_store::VersionStore;
