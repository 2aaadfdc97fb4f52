//! The identity object shared by every holder of a version

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::store::Snapshot;

use super::id::VersionId;

/// A dictionary version.
///
/// Exactly one instance exists per [`VersionId`] inside a registry. The
/// snapshot is installed lazily by the store and is immutable once installed.
pub struct DictionaryVersion {
    id: VersionId,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl DictionaryVersion {
    pub(crate) fn new(id: VersionId) -> Self {
        Self {
            id,
            snapshot: RwLock::new(None),
        }
    }

    pub fn id(&self) -> VersionId {
        self.id
    }

    /// Canonical version name (`dictionary_<date>`)
    pub fn name(&self) -> String {
        self.id.name()
    }

    /// Whether the snapshot fields have been materialized.
    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// The installed snapshot, if loaded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Install a snapshot. The first install wins; later calls return the
    /// snapshot already in place.
    pub(crate) fn install(&self, snapshot: impl Into<Arc<Snapshot>>) -> Arc<Snapshot> {
        let mut guard = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get_or_insert_with(|| snapshot.into()).clone()
    }
}

impl fmt::Display for DictionaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for DictionaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryVersion")
            .field("id", &self.id.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PartialEq for DictionaryVersion {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DictionaryVersion {}

impl PartialOrd for DictionaryVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DictionaryVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for DictionaryVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
