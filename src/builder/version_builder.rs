//! All-or-nothing construction of a new dictionary version

use std::sync::Arc;

use crate::cache::{CacheManager, GraphDerivation, RelationGraphEngine};
use crate::errors::{LexiconError, LexiconResult};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::{discard, Snapshot, VersionStore};
use crate::version::{DictionaryVersion, VersionRegistry};

use super::apply::apply_edit;
use super::clock::{reserve_version_id, Clock, SystemClock};
use super::edit::VersionEdit;

/// Builds new versions from an old one plus a [`VersionEdit`].
///
/// A build either registers a fully persisted version (snapshot JSON and
/// graph artifact on disk, snapshot installed in memory) or fails leaving
/// neither file behind and the registry untouched. The new identity is
/// reserved before anything is written, so concurrent builds never share one.
pub struct VersionBuilder<E> {
    registry: Arc<VersionRegistry>,
    store: Arc<VersionStore>,
    cache: Arc<CacheManager<E>>,
    clock: Box<dyn Clock>,
    languages: Vec<String>,
}

impl<E: RelationGraphEngine> VersionBuilder<E> {
    pub fn new(
        registry: Arc<VersionRegistry>,
        store: Arc<VersionStore>,
        cache: Arc<CacheManager<E>>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            registry,
            store,
            cache,
            clock: Box::new(SystemClock::new()),
            languages,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Create the version that follows `old` (default: the latest known
    /// version).
    ///
    /// # Errors
    ///
    /// Any load, edit, coherence or persistence failure. Nothing is persisted
    /// or registered on failure.
    pub fn create_dictionary_version(
        &self,
        old: Option<&Arc<DictionaryVersion>>,
        edit: &VersionEdit,
    ) -> LexiconResult<Arc<DictionaryVersion>> {
        let old = match old {
            Some(version) => Arc::clone(version),
            None => self.registry.resolve(self.store.latest_version()?)?,
        };

        let old_name = old.name();
        let scope = ObservationScope::with_fields("VERSION_BUILD", &[("from", &old_name)]);
        match self.build(&old, edit) {
            Ok(version) => {
                scope.complete_with_fields(&[("version", &version.name())]);
                Ok(version)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn build(&self, old: &DictionaryVersion, edit: &VersionEdit) -> LexiconResult<Arc<DictionaryVersion>> {
        let old_snapshot = self.store.load(old)?;

        let after = Some(old.id()).max(self.store.latest_installed()?);
        let version = reserve_version_id(self.clock.as_ref(), after, &self.registry);

        match self.persist(old, &old_snapshot, &version, edit) {
            Ok(derivation) => {
                let graph = if derivation.is_clone() { "cloned" } else { "rebuilt" };
                log_event_with_fields(
                    Event::VersionCreated,
                    &[("from", &old.name()), ("graph", graph), ("version", &version.name())],
                );
                Ok(version)
            }
            Err(e) => {
                self.registry.release(&version);
                Err(e)
            }
        }
    }

    /// Write the graph artifact and snapshot of the reserved `version`, then
    /// install the snapshot. Removes whatever was written on failure.
    fn persist(
        &self,
        old: &DictionaryVersion,
        old_snapshot: &Snapshot,
        version: &DictionaryVersion,
        edit: &VersionEdit,
    ) -> LexiconResult<GraphDerivation> {
        let new_id = version.id();
        let snapshot = apply_edit(old_snapshot, &old.name(), &new_id.name(), edit, &self.languages)?;
        let derivation = self.cache.derive(old, old_snapshot, new_id, &snapshot)?;

        let graph_path = self.cache.save(derivation.graph())?;
        let snapshot_path = match self.store.save(new_id, &snapshot) {
            Ok(path) => path,
            Err(e) => {
                discard(&graph_path);
                return Err(e);
            }
        };

        let snapshot = Arc::new(snapshot);
        let installed = version.install(Arc::clone(&snapshot));
        if !Arc::ptr_eq(&installed, &snapshot) && installed != snapshot {
            discard(&snapshot_path);
            discard(&graph_path);
            return Err(LexiconError::InvariantViolation(format!(
                "{} was installed with another snapshot during its build",
                new_id
            )));
        }

        Ok(derivation)
    }
}
