//! Version Identity Invariant Tests
//!
//! Tests for invariants:
//! - One live identity per normalized timestamp, whatever the input form
//! - Resolution is atomic under concurrent callers
//! - Identities order by timestamp
//! - A failed load does not poison the identity

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{NaiveDate, TimeZone, Utc};
use common::{install, V0, V0_DATE};
use lexicon::store::VersionStore;
use lexicon::version::{VersionId, VersionRef, VersionRegistry};
use tempfile::TempDir;

/// Every accepted form of the same timestamp resolves to one instance.
#[test]
fn test_all_forms_share_identity() {
    let registry = VersionRegistry::new(None);
    let naive = NaiveDate::from_ymd_opt(2023, 7, 14)
        .unwrap()
        .and_hms_micro_opt(9, 15, 30, 999_999)
        .unwrap();

    let forms: Vec<VersionRef> = vec![
        "2023-07-14_09:15:30".into(),
        "dictionary_2023-07-14_09:15:30".into(),
        "dictionary_2023-07-14_09:15:30.json".into(),
        "dictionary_2023-07-14_09-15-30.json".into(),
        naive.into(),
        Utc.from_utc_datetime(&naive).into(),
        VersionId::from_datetime(naive).into(),
    ];

    let first = registry.resolve(forms[0].clone()).unwrap();
    for form in forms {
        let version = registry.resolve(form.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &version), "{:?}", form);
    }
    assert_eq!(registry.len(), 1);
}

/// Threads racing on the same timestamp all receive the same instance.
#[test]
fn test_concurrent_resolution() {
    const THREADS: usize = 16;
    let registry = Arc::new(VersionRegistry::new(None));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let identifier = if i % 2 == 0 {
                    "2022-02-02_22:22:22".to_string()
                } else {
                    "dictionary_2022-02-02_22-22-22.json".to_string()
                };
                registry.resolve(identifier).unwrap()
            })
        })
        .collect();

    let versions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(versions.iter().all(|v| Arc::ptr_eq(v, &versions[0])));
    assert_eq!(registry.len(), 1);
}

/// Identities sort chronologically, not lexically by input form.
#[test]
fn test_chronological_order() {
    let registry = VersionRegistry::new(None);
    let mut versions = vec![
        registry.resolve("dictionary_2021-01-01_00:00:01").unwrap(),
        registry.resolve("2020-12-31_23:59:59").unwrap(),
        registry.resolve("dictionary_2021-01-01_00-00-00.json").unwrap(),
    ];
    versions.sort();
    let names: Vec<String> = versions.iter().map(|v| v.name()).collect();
    assert_eq!(
        names,
        vec![
            "dictionary_2020-12-31_23:59:59",
            "dictionary_2021-01-01_00:00:00",
            "dictionary_2021-01-01_00:00:01",
        ]
    );
}

/// Absent identifiers fall back to the configured default.
#[test]
fn test_default_identifier() {
    let unconfigured = VersionRegistry::new(None);
    let err = unconfigured.resolve(None::<&str>).unwrap_err();
    assert_eq!(err.code(), "LEX_CONFIGURATION");

    let configured = VersionRegistry::new(Some(V0_DATE.to_string()));
    let default = configured.resolve(None::<&str>).unwrap();
    assert!(Arc::ptr_eq(&default, &configured.resolve(V0_DATE).unwrap()));
}

/// Malformed identifiers are rejected without registering anything.
#[test]
fn test_unparseable_identifiers() {
    let registry = VersionRegistry::new(None);
    for bad in ["", "dictionary_", "2020-13-01_00:00:00", "2020-01-01", "latest.json"] {
        let err = registry.resolve(bad).unwrap_err();
        assert_eq!(err.code(), "LEX_IDENTITY_RESOLUTION", "{:?}", bad);
    }
    assert!(registry.is_empty());
}

/// A load that fails leaves the same identity retryable.
#[test]
fn test_failed_load_can_be_retried() {
    let temp_dir = TempDir::new().unwrap();
    let registry = VersionRegistry::new(None);
    let store = VersionStore::new(temp_dir.path(), None).unwrap();
    let version = registry.resolve(V0_DATE).unwrap();

    assert!(store.load(&version).is_err());
    assert!(!version.is_loaded());

    install(temp_dir.path(), V0_DATE, V0);
    let snapshot = store.load(&version).unwrap();
    assert!(version.is_loaded());
    assert!(Arc::ptr_eq(&version, &registry.resolve(V0_DATE).unwrap()));
    assert!(Arc::ptr_eq(&snapshot, &version.snapshot().unwrap()));
}
