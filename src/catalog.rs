//! Wiring of every lexicon component behind one handle

use std::sync::Arc;

use crate::builder::{Clock, VersionBuilder, VersionEdit};
use crate::cache::{CacheManager, RelationGraph, RelationGraphEngine};
use crate::config::Config;
use crate::defaults::DefaultVersion;
use crate::diff::{DiffResolver, TermMapping};
use crate::errors::LexiconResult;
use crate::store::{Snapshot, VersionStore};
use crate::version::{DictionaryVersion, VersionRef, VersionRegistry};

/// Registry, store, resolver, graph cache, builder and default holder
/// sharing one configuration.
pub struct Catalog<E> {
    config: Config,
    registry: Arc<VersionRegistry>,
    store: Arc<VersionStore>,
    resolver: DiffResolver,
    cache: Arc<CacheManager<E>>,
    builder: VersionBuilder<E>,
    defaults: DefaultVersion,
}

impl<E: RelationGraphEngine> Catalog<E> {
    pub fn open(config: Config, engine: E) -> LexiconResult<Self> {
        config.validate()?;
        let store = Arc::new(config.open_store()?);
        Ok(Self::assemble(config, store, engine))
    }

    /// Open over an already-built store (custom remote sources).
    pub fn with_store(config: Config, store: VersionStore, engine: E) -> LexiconResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, Arc::new(store), engine))
    }

    fn assemble(config: Config, store: Arc<VersionStore>, engine: E) -> Self {
        let registry = Arc::new(VersionRegistry::new(config.default_version.clone()));
        let cache = Arc::new(CacheManager::new(store.versions_dir(), engine));
        let builder = VersionBuilder::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            Arc::clone(&cache),
            config.languages.clone(),
        );
        Self {
            resolver: DiffResolver::new(Arc::clone(&registry), Arc::clone(&store)),
            defaults: DefaultVersion::new(Arc::clone(&registry), Arc::clone(&store)),
            config,
            registry,
            store,
            cache,
            builder,
        }
    }

    /// Replace the timestamp source used for new versions
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.builder = self.builder.with_clock(clock);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<VersionRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<VersionStore> {
        &self.store
    }

    pub fn cache(&self) -> &CacheManager<E> {
        &self.cache
    }

    pub fn resolver(&self) -> &DiffResolver {
        &self.resolver
    }

    /// Resolve an identifier. `VersionRef::Default` goes through the default
    /// holder rather than only the configured identifier.
    pub fn resolve(&self, identifier: impl Into<VersionRef>) -> LexiconResult<Arc<DictionaryVersion>> {
        match identifier.into() {
            VersionRef::Default => self.defaults.get(),
            other => self.registry.resolve(other),
        }
    }

    pub fn load(&self, version: &DictionaryVersion) -> LexiconResult<Arc<Snapshot>> {
        self.store.load(version)
    }

    /// Map every term of `older` to its equivalent in `newer`.
    pub fn migrate(
        &self,
        newer: &DictionaryVersion,
        older: &DictionaryVersion,
    ) -> LexiconResult<Arc<TermMapping>> {
        self.resolver.migrate(newer, older)
    }

    /// Build and register the version that follows `old` (default: latest).
    pub fn create_version(
        &self,
        old: Option<&Arc<DictionaryVersion>>,
        edit: &VersionEdit,
    ) -> LexiconResult<Arc<DictionaryVersion>> {
        self.builder.create_dictionary_version(old, edit)
    }

    pub fn default_version(&self) -> LexiconResult<Arc<DictionaryVersion>> {
        self.defaults.get()
    }

    pub fn set_default_version(
        &self,
        version: impl Into<VersionRef>,
    ) -> LexiconResult<Arc<DictionaryVersion>> {
        self.defaults.set(version)
    }

    /// Relation graph of a version, loading the version first if needed.
    pub fn relation_graph(&self, version: &DictionaryVersion) -> LexiconResult<RelationGraph> {
        let snapshot = self.store.load(version)?;
        self.cache.relation_graph(version, &snapshot)
    }
}
