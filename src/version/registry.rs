//! Version identity registry
//!
//! Guarantees a single live [`DictionaryVersion`] per normalized timestamp.
//! Resolution is an atomic check-then-insert under one mutex, so concurrent
//! callers resolving the same timestamp always receive the same `Arc`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::{LexiconError, LexiconResult};

use super::id::VersionId;
use super::identity::DictionaryVersion;

/// Anything that can be resolved to a version.
#[derive(Debug, Clone)]
pub enum VersionRef {
    /// The configured default identifier
    Default,
    /// A string form (date string, version name or filename)
    Name(String),
    /// A native timestamp
    Timestamp(NaiveDateTime),
    /// An already-normalized id
    Id(VersionId),
    /// An already-resolved identity (passed through unchanged)
    Version(Arc<DictionaryVersion>),
}

impl From<&str> for VersionRef {
    fn from(name: &str) -> Self {
        VersionRef::Name(name.to_string())
    }
}

impl From<String> for VersionRef {
    fn from(name: String) -> Self {
        VersionRef::Name(name)
    }
}

impl From<&String> for VersionRef {
    fn from(name: &String) -> Self {
        VersionRef::Name(name.clone())
    }
}

impl From<NaiveDateTime> for VersionRef {
    fn from(date: NaiveDateTime) -> Self {
        VersionRef::Timestamp(date)
    }
}

impl From<DateTime<Utc>> for VersionRef {
    fn from(date: DateTime<Utc>) -> Self {
        VersionRef::Timestamp(date.naive_utc())
    }
}

impl From<VersionId> for VersionRef {
    fn from(id: VersionId) -> Self {
        VersionRef::Id(id)
    }
}

impl From<Arc<DictionaryVersion>> for VersionRef {
    fn from(version: Arc<DictionaryVersion>) -> Self {
        VersionRef::Version(version)
    }
}

impl From<&Arc<DictionaryVersion>> for VersionRef {
    fn from(version: &Arc<DictionaryVersion>) -> Self {
        VersionRef::Version(Arc::clone(version))
    }
}

impl<T: Into<VersionRef>> From<Option<T>> for VersionRef {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(VersionRef::Default)
    }
}

/// Registry of live version identities.
#[derive(Debug, Default)]
pub struct VersionRegistry {
    instances: Mutex<HashMap<VersionId, Arc<DictionaryVersion>>>,
    default_identifier: Option<String>,
}

impl VersionRegistry {
    /// Create a registry. `default_identifier` is what `VersionRef::Default`
    /// resolves to.
    pub fn new(default_identifier: Option<String>) -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            default_identifier,
        }
    }

    /// Resolve an identifier to its unique identity object.
    ///
    /// # Errors
    ///
    /// - `Configuration` when asked for the default and none is configured
    /// - `IdentityResolution` when a string cannot be parsed
    pub fn resolve(&self, identifier: impl Into<VersionRef>) -> LexiconResult<Arc<DictionaryVersion>> {
        let id = match identifier.into() {
            VersionRef::Version(version) => return Ok(version),
            VersionRef::Id(id) => id,
            VersionRef::Timestamp(date) => VersionId::from_datetime(date),
            VersionRef::Name(name) => VersionId::parse(&name)?,
            VersionRef::Default => {
                let name = self.default_identifier.as_deref().ok_or_else(|| {
                    LexiconError::Configuration("no default version configured".to_string())
                })?;
                VersionId::parse(name)?
            }
        };

        let mut instances = self.lock();
        let version = instances
            .entry(id)
            .or_insert_with(|| Arc::new(DictionaryVersion::new(id)));
        Ok(Arc::clone(version))
    }

    /// Register `id` as a brand new identity.
    ///
    /// Returns `None` when `id` is already registered, so two callers can
    /// never both claim the same id.
    pub fn reserve(&self, id: VersionId) -> Option<Arc<DictionaryVersion>> {
        match self.lock().entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(Arc::clone(slot.insert(Arc::new(DictionaryVersion::new(id))))),
        }
    }

    /// Drop a reserved identity whose construction failed.
    ///
    /// Only removes the entry if it is still `version` itself.
    pub fn release(&self, version: &Arc<DictionaryVersion>) -> bool {
        let mut instances = self.lock();
        let owned = instances
            .get(&version.id())
            .is_some_and(|registered| Arc::ptr_eq(registered, version));
        if owned {
            instances.remove(&version.id());
        }
        owned
    }

    /// Look up an identity without creating it.
    pub fn get(&self, id: VersionId) -> Option<Arc<DictionaryVersion>> {
        self.lock().get(&id).cloned()
    }

    pub fn contains(&self, id: VersionId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The configured default identifier, if any
    pub fn default_identifier(&self) -> Option<&str> {
        self.default_identifier.as_deref()
    }

    /// Drop every registered identity. Outstanding `Arc`s stay valid but are
    /// no longer returned by `resolve`.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<VersionId, Arc<DictionaryVersion>>> {
        match self.instances.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_resolve_same_instance_for_all_forms() {
        let registry = VersionRegistry::new(None);
        let a = registry.resolve("dictionary_2022-01-02_03:04:05").unwrap();
        let b = registry.resolve("2022-01-02_03:04:05").unwrap();
        let c = registry.resolve("dictionary_2022-01-02_03-04-05.json").unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 250)
            .unwrap();
        let d = registry.resolve(date).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert!(Arc::ptr_eq(&a, &d));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_passes_identity_through() {
        let registry = VersionRegistry::new(None);
        let a = registry.resolve("2022-01-02_03:04:05").unwrap();
        let b = registry.resolve(&a).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_default_requires_configuration() {
        let registry = VersionRegistry::new(None);
        let err = registry.resolve(VersionRef::Default).unwrap_err();
        assert_eq!(err.code(), "LEX_CONFIGURATION");

        let registry = VersionRegistry::new(Some("dictionary_2021-05-05_10:00:00".into()));
        let none: Option<&str> = None;
        let version = registry.resolve(none).unwrap();
        assert_eq!(version.name(), "dictionary_2021-05-05_10:00:00");
    }

    #[test]
    fn test_unparseable_identifier() {
        let registry = VersionRegistry::new(None);
        let err = registry.resolve("yesterday").unwrap_err();
        assert_eq!(err.code(), "LEX_IDENTITY_RESOLUTION");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_evicts() {
        let registry = VersionRegistry::new(None);
        let a = registry.resolve("2022-01-02_03:04:05").unwrap();
        registry.clear();
        assert!(registry.get(a.id()).is_none());
        let b = registry.resolve("2022-01-02_03:04:05").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_reserve_claims_once() {
        let registry = VersionRegistry::new(None);
        let id = VersionId::parse("2022-01-02_03:04:05").unwrap();

        let reserved = registry.reserve(id).unwrap();
        assert!(registry.reserve(id).is_none());
        assert!(Arc::ptr_eq(&reserved, &registry.resolve(id).unwrap()));

        let existing = registry.resolve("2023-01-01_00:00:00").unwrap();
        assert!(registry.reserve(existing.id()).is_none());
    }

    #[test]
    fn test_release_only_own_reservation() {
        let registry = VersionRegistry::new(None);
        let id = VersionId::parse("2022-01-02_03:04:05").unwrap();
        let reserved = registry.reserve(id).unwrap();

        let stranger = Arc::new(DictionaryVersion::new(id));
        assert!(!registry.release(&stranger));
        assert!(registry.contains(id));

        assert!(registry.release(&reserved));
        assert!(!registry.contains(id));
        assert!(registry.reserve(id).is_some());
    }

    #[test]
    fn test_ordering_by_timestamp() {
        let registry = VersionRegistry::new(None);
        let older = registry.resolve("2020-01-01_00:00:00").unwrap();
        let newer = registry.resolve("2021-01-01_00:00:00").unwrap();
        assert!(older < newer);
        let mut versions = vec![Arc::clone(&newer), Arc::clone(&older)];
        versions.sort();
        assert!(Arc::ptr_eq(&versions[0], &older));
    }
}
