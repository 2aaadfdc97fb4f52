//! Chronological diff composition
//!
//! Each version carries `diff[v]`: how terms of version `v` were renamed or
//! removed by the version that followed `v`. Migrating from an older version
//! replays every diff at or after it, oldest first.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use crate::errors::LexiconResult;
use crate::observability::{log_event_with_fields, Event};
use crate::store::VersionStore;
use crate::version::{DictionaryVersion, VersionId, VersionRegistry};

/// old term -> current term
pub type TermMapping = BTreeMap<String, String>;

/// Number of `(newer, older)` mappings kept in memory
pub const MIGRATION_CACHE_CAPACITY: usize = 5;

type MigrationCache = LruCache<(VersionId, VersionId), Arc<TermMapping>>;

pub struct DiffResolver {
    registry: Arc<VersionRegistry>,
    store: Arc<VersionStore>,
    cache: Mutex<MigrationCache>,
}

impl DiffResolver {
    pub fn new(registry: Arc<VersionRegistry>, store: Arc<VersionStore>) -> Self {
        let capacity = NonZeroUsize::new(MIGRATION_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            registry,
            store,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Map every term of `older` to its equivalent in `newer`.
    ///
    /// A term removed along the way stays mapped to the last name it had
    /// before removal.
    ///
    /// # Errors
    ///
    /// Propagates load failures of either version and `IdentityResolution`
    /// for unparseable diff keys.
    pub fn migrate(
        &self,
        newer: &DictionaryVersion,
        older: &DictionaryVersion,
    ) -> LexiconResult<Arc<TermMapping>> {
        let key = (newer.id(), older.id());
        if let Some(mapping) = self.lock().get(&key) {
            return Ok(Arc::clone(mapping));
        }

        let mapping = Arc::new(self.compose(newer, older)?);
        log_event_with_fields(
            Event::MigrationComputed,
            &[
                ("from", &older.name()),
                ("terms", &mapping.len().to_string()),
                ("to", &newer.name()),
            ],
        );
        self.lock().put(key, Arc::clone(&mapping));
        Ok(mapping)
    }

    /// Current equivalent of a single term of `older`.
    pub fn translate(
        &self,
        newer: &DictionaryVersion,
        older: &DictionaryVersion,
        term: &str,
    ) -> LexiconResult<Option<String>> {
        Ok(self.migrate(newer, older)?.get(term).cloned())
    }

    fn compose(&self, newer: &DictionaryVersion, older: &DictionaryVersion) -> LexiconResult<TermMapping> {
        let older_snapshot = self.store.load(older)?;
        let newer_snapshot = self.store.load(newer)?;

        let mut mapping: TermMapping = older_snapshot
            .terms
            .iter()
            .map(|t| (t.clone(), t.clone()))
            .collect();

        let mut chronology = Vec::new();
        for name in newer_snapshot.diff.keys() {
            let version = self.registry.resolve(name)?;
            if version.id() >= older.id() {
                chronology.push((version.id(), name));
            }
        }
        chronology.sort();

        for (_, name) in chronology {
            let diff = &newer_snapshot.diff[name];
            for current in mapping.values_mut() {
                if let Some(Some(renamed)) = diff.get(current.as_str()) {
                    *current = renamed.clone();
                }
            }
        }

        Ok(mapping)
    }

    /// Cached `(newer, older)` pairs, most recently used first.
    pub fn cached_pairs(&self) -> Vec<(VersionId, VersionId)> {
        self.lock().iter().map(|(key, _)| *key).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MigrationCache> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, date: &str, body: &str) {
        let id = VersionId::parse(date).unwrap();
        fs::write(dir.path().join(id.local_file_name()), body).unwrap();
    }

    fn setup() -> (TempDir, DiffResolver, Arc<VersionRegistry>) {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "2020-01-01_00:00:00",
            r#"{"version": "2020-01-01_00:00:00", "terms": ["A", "B", "C"], "roots": [],
                "inhibitions": {}, "translations": {}}"#,
        );
        write(
            &dir,
            "2020-02-01_00:00:00",
            r#"{"version": "2020-02-01_00:00:00", "terms": ["A", "B2", "C"], "roots": [],
                "inhibitions": {}, "translations": {},
                "diff": {"dictionary_2020-01-01_00:00:00": {"B": "B2"}}}"#,
        );
        write(
            &dir,
            "2020-03-01_00:00:00",
            r#"{"version": "2020-03-01_00:00:00", "terms": ["A", "B3"], "roots": [],
                "inhibitions": {}, "translations": {},
                "diff": {"dictionary_2020-01-01_00:00:00": {"B": "B2"},
                         "dictionary_2020-02-01_00:00:00": {"B2": "B3", "C": null}}}"#,
        );

        let registry = Arc::new(VersionRegistry::new(None));
        let store = Arc::new(VersionStore::new(dir.path(), None).unwrap());
        let resolver = DiffResolver::new(Arc::clone(&registry), store);
        (dir, resolver, registry)
    }

    #[test]
    fn test_migrate_composes_renames() {
        let (_dir, resolver, registry) = setup();
        let v0 = registry.resolve("2020-01-01_00:00:00").unwrap();
        let v2 = registry.resolve("2020-03-01_00:00:00").unwrap();

        let mapping = resolver.migrate(&v2, &v0).unwrap();
        assert_eq!(mapping["A"], "A");
        assert_eq!(mapping["B"], "B3");
        assert_eq!(mapping["C"], "C", "removed term keeps its last name");
    }

    #[test]
    fn test_migrate_to_self_is_identity() {
        let (_dir, resolver, registry) = setup();
        let v1 = registry.resolve("2020-02-01_00:00:00").unwrap();
        let mapping = resolver.migrate(&v1, &v1).unwrap();
        assert_eq!(mapping.len(), 3);
        assert!(mapping.iter().all(|(k, v)| k == v));
    }

    #[test]
    fn test_cache_is_bounded() {
        let (_dir, resolver, registry) = setup();
        let versions: Vec<_> = ["2020-01-01_00:00:00", "2020-02-01_00:00:00", "2020-03-01_00:00:00"]
            .iter()
            .map(|d| registry.resolve(*d).unwrap())
            .collect();

        for newer in &versions {
            for older in &versions {
                resolver.migrate(newer, older).unwrap();
            }
        }
        assert_eq!(resolver.cached_pairs().len(), MIGRATION_CACHE_CAPACITY);
        assert_eq!(
            resolver.cached_pairs()[0],
            (versions[2].id(), versions[2].id())
        );
    }

    #[test]
    fn test_repeated_calls_share_result() {
        let (_dir, resolver, registry) = setup();
        let v0 = registry.resolve("2020-01-01_00:00:00").unwrap();
        let v2 = registry.resolve("2020-03-01_00:00:00").unwrap();
        let first = resolver.migrate(&v2, &v0).unwrap();
        let second = resolver.migrate(&v2, &v0).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.translate(&v2, &v0, "B").unwrap().as_deref(), Some("B3"));
    }
}
