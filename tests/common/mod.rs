//! Shared fixtures for integration tests
//!
//! - `CountingEngine`: relation graph engine that counts builds and clones
//! - snapshot fixtures written straight into a versions directory
//! - a catalog over a temp directory driven by a manual clock

#![allow(dead_code)] // Not every test file uses every helper

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use lexicon::builder::ManualClock;
use lexicon::cache::{CoherenceError, RelationGraph, RelationGraphEngine};
use lexicon::store::{Inhibitions, TermSet};
use lexicon::version::VersionId;
use lexicon::{Catalog, Config};
use tempfile::TempDir;

/// `terms={A,B}, roots={A}, translations.en={A: alpha, B: beta}`
pub const V0_DATE: &str = "2020-01-01_00:00:00";
pub const V0_NAME: &str = "dictionary_2020-01-01_00:00:00";
pub const V0: &str = r#"{
    "version": "2020-01-01_00:00:00",
    "terms": ["A", "B"],
    "roots": ["A"],
    "inhibitions": {},
    "translations": {"en": {"A": "alpha", "B": "beta"}}
}"#;

// =============================================================================
// Counting engine
// =============================================================================

/// Relates every root to every other term by `contains`, unless the root
/// inhibits `contains`. Rejects any term set containing a poisoned term.
#[derive(Default)]
pub struct CountingEngine {
    builds: AtomicUsize,
    clones: AtomicUsize,
    poisoned: Mutex<BTreeSet<String>>,
}

impl CountingEngine {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    /// Make every later build containing `term` fail the coherence check
    pub fn poison(&self, term: &str) {
        self.poisoned.lock().unwrap().insert(term.to_string());
    }
}

impl RelationGraphEngine for CountingEngine {
    fn build_relation_graph(
        &self,
        version: VersionId,
        terms: &TermSet,
        roots: &TermSet,
        inhibitions: &Inhibitions,
    ) -> Result<RelationGraph, CoherenceError> {
        self.builds.fetch_add(1, Ordering::SeqCst);

        let poisoned = self.poisoned.lock().unwrap();
        if let Some(term) = terms.iter().find(|t| poisoned.contains(*t)) {
            return Err(CoherenceError::new(format!("{} breaks the paradigm table", term)));
        }

        let mut graph = RelationGraph::new(version);
        for root in roots {
            let inhibited = inhibitions
                .get(root)
                .is_some_and(|kinds| kinds.iter().any(|k| k == "contains"));
            if inhibited {
                continue;
            }
            for term in terms.iter().filter(|t| *t != root) {
                graph.relate(root, "contains", term);
            }
        }
        Ok(graph)
    }

    fn clone_relation_graph(&self, graph: &RelationGraph, version: VersionId) -> RelationGraph {
        self.clones.fetch_add(1, Ordering::SeqCst);
        RelationGraph {
            version: version.name(),
            relations: graph.relations.clone(),
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Write a snapshot document as the local copy of `date`
pub fn install(versions_dir: &Path, date: &str, document: &str) {
    fs::create_dir_all(versions_dir).unwrap();
    let id = VersionId::parse(date).unwrap();
    fs::write(versions_dir.join(id.local_file_name()), document).unwrap();
}

/// Write a snapshot document into a remote mirror directory
pub fn publish(mirror_dir: &Path, date: &str, document: &str) {
    fs::create_dir_all(mirror_dir).unwrap();
    let id = VersionId::parse(date).unwrap();
    fs::write(mirror_dir.join(id.remote_file_name()), document).unwrap();
}

/// Files in a directory, sorted
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Catalog over `<temp>/versions` holding V0, building with a manual clock
/// that starts at 2021-01-01 00:00:00.
pub fn catalog_with_v0(temp_dir: &TempDir, languages: &[&str]) -> Catalog<CountingEngine> {
    let versions = temp_dir.path().join("versions");
    install(&versions, V0_DATE, V0);

    let config = Config::new(&versions).with_languages(languages.iter().copied());
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
    Catalog::open(config, CountingEngine::default())
        .unwrap()
        .with_clock(Box::new(clock))
}
