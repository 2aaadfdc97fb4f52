//! Default dictionary version holder
//!
//! The default is resolved lazily on first access, in this order:
//!
//! 1. a version set explicitly with [`DefaultVersion::set`]
//! 2. the configured default identifier
//! 3. the latest version installed locally
//! 4. the latest version published remotely, downloaded and installed
//!
//! With none of these available, access fails with `Configuration`.

use std::sync::{Arc, RwLock};

use crate::errors::{LexiconError, LexiconResult};
use crate::observability::{log_event_with_fields, Event};
use crate::store::VersionStore;
use crate::version::{DictionaryVersion, VersionRef, VersionRegistry};

pub struct DefaultVersion {
    registry: Arc<VersionRegistry>,
    store: Arc<VersionStore>,
    current: RwLock<Option<Arc<DictionaryVersion>>>,
}

impl DefaultVersion {
    pub fn new(registry: Arc<VersionRegistry>, store: Arc<VersionStore>) -> Self {
        Self {
            registry,
            store,
            current: RwLock::new(None),
        }
    }

    /// The default version, resolving it on first access.
    pub fn get(&self) -> LexiconResult<Arc<DictionaryVersion>> {
        if let Some(version) = self.peek() {
            return Ok(version);
        }

        let (version, source) = self.discover()?;
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = current.as_ref() {
            return Ok(Arc::clone(existing));
        }
        log_event_with_fields(
            Event::DefaultVersionSet,
            &[("source", source), ("version", &version.name())],
        );
        *current = Some(Arc::clone(&version));
        Ok(version)
    }

    /// Replace the default version.
    pub fn set(&self, version: impl Into<VersionRef>) -> LexiconResult<Arc<DictionaryVersion>> {
        let version = self.registry.resolve(version)?;
        log_event_with_fields(
            Event::DefaultVersionSet,
            &[("source", "explicit"), ("version", &version.name())],
        );
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Some(Arc::clone(&version));
        Ok(version)
    }

    /// The default if already resolved, without triggering discovery
    pub fn peek(&self) -> Option<Arc<DictionaryVersion>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn discover(&self) -> LexiconResult<(Arc<DictionaryVersion>, &'static str)> {
        if self.registry.default_identifier().is_some() {
            return Ok((self.registry.resolve(VersionRef::Default)?, "configured"));
        }

        if let Some(id) = self.store.latest_installed()? {
            return Ok((self.registry.resolve(id)?, "installed"));
        }

        if let Some(id) = self.store.available_versions()?.into_iter().max() {
            let version = self.registry.resolve(id)?;
            self.store.load(&version)?;
            return Ok((version, "remote"));
        }

        Err(LexiconError::Configuration(format!(
            "no default version: nothing configured, installed in {} or available remotely",
            self.store.versions_dir().display()
        )))
    }
}
