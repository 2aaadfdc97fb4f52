//! Reuse-or-rebuild policy for derived relation graphs

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{LexiconError, LexiconResult};
use crate::observability::{log_event_with_fields, Event};
use crate::store::{write_atomic, Snapshot};
use crate::version::{DictionaryVersion, VersionId};

use super::artifact;
use super::graph::{RelationGraph, RelationGraphEngine};

/// How the graph of a new version was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphDerivation {
    /// Graph inputs unchanged; the previous graph was cloned
    Cloned(RelationGraph),
    /// Graph inputs changed; the engine built and checked a new graph
    Rebuilt(RelationGraph),
}

impl GraphDerivation {
    pub fn graph(&self) -> &RelationGraph {
        match self {
            GraphDerivation::Cloned(graph) | GraphDerivation::Rebuilt(graph) => graph,
        }
    }

    pub fn into_graph(self) -> RelationGraph {
        match self {
            GraphDerivation::Cloned(graph) | GraphDerivation::Rebuilt(graph) => graph,
        }
    }

    pub fn is_clone(&self) -> bool {
        matches!(self, GraphDerivation::Cloned(_))
    }
}

/// Owns the graph engine and the on-disk graph artifacts.
pub struct CacheManager<E> {
    cache_dir: PathBuf,
    engine: E,
}

impl<E: RelationGraphEngine> CacheManager<E> {
    pub fn new(cache_dir: impl Into<PathBuf>, engine: E) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            engine,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn artifact_path(&self, id: VersionId) -> PathBuf {
        self.cache_dir.join(id.cache_file_name())
    }

    pub fn is_cached(&self, id: VersionId) -> bool {
        self.artifact_path(id).is_file()
    }

    /// Persist a graph under the version it references.
    pub fn save(&self, graph: &RelationGraph) -> LexiconResult<PathBuf> {
        let id = VersionId::parse(&graph.version).map_err(|_| {
            LexiconError::Corruption(format!("graph references unknown version {:?}", graph.version))
        })?;
        let path = self.artifact_path(id);
        write_atomic(&path, &artifact::encode(graph)?)?;
        log_event_with_fields(Event::GraphCacheSaved, &[("path", &path.display().to_string())]);
        Ok(path)
    }

    /// Read the cached graph of a version.
    ///
    /// # Errors
    ///
    /// `Io` if the artifact cannot be read, `Corruption` if it fails
    /// verification or belongs to another version.
    pub fn load(&self, id: VersionId) -> LexiconResult<RelationGraph> {
        let path = self.artifact_path(id);
        let bytes = fs::read(&path).map_err(|e| LexiconError::io_at(&path, e))?;
        let graph = artifact::decode(&bytes)?;
        if graph.version != id.name() {
            return Err(LexiconError::Corruption(format!(
                "artifact {} holds the graph of {}",
                path.display(),
                graph.version
            )));
        }
        log_event_with_fields(Event::GraphCacheLoaded, &[("version", &graph.version)]);
        Ok(graph)
    }

    /// Graph of a loaded version: from cache when present, otherwise built
    /// by the engine and cached.
    ///
    /// A corrupt artifact is logged and replaced by a rebuild.
    pub fn relation_graph(
        &self,
        version: &DictionaryVersion,
        snapshot: &Snapshot,
    ) -> LexiconResult<RelationGraph> {
        let id = version.id();
        if self.is_cached(id) {
            match self.load(id) {
                Ok(graph) => return Ok(graph),
                Err(LexiconError::Corruption(reason)) => {
                    log_event_with_fields(
                        Event::GraphCacheCorrupt,
                        &[("reason", &reason), ("version", &id.name())],
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let graph = self.build(id, snapshot)?;
        self.save(&graph)?;
        Ok(graph)
    }

    /// Derive the graph of `new_id` from its predecessor.
    ///
    /// Clones the old graph when terms, roots and inhibitions are unchanged;
    /// otherwise asks the engine for a fresh, coherence-checked graph. The
    /// result is not persisted.
    pub fn derive(
        &self,
        old: &DictionaryVersion,
        old_snapshot: &Snapshot,
        new_id: VersionId,
        new_snapshot: &Snapshot,
    ) -> LexiconResult<GraphDerivation> {
        if old_snapshot.same_graph_inputs(new_snapshot) {
            let old_graph = self.relation_graph(old, old_snapshot)?;
            let graph = self.engine.clone_relation_graph(&old_graph, new_id);
            log_event_with_fields(
                Event::GraphCloned,
                &[("from", &old.name()), ("to", &new_id.name())],
            );
            return Ok(GraphDerivation::Cloned(graph));
        }

        Ok(GraphDerivation::Rebuilt(self.build(new_id, new_snapshot)?))
    }

    fn build(&self, id: VersionId, snapshot: &Snapshot) -> LexiconResult<RelationGraph> {
        let graph = self.engine.build_relation_graph(
            id,
            &snapshot.terms,
            &snapshot.roots,
            &snapshot.inhibitions,
        )?;
        log_event_with_fields(
            Event::GraphRebuilt,
            &[("terms", &snapshot.terms.len().to_string()), ("version", &id.name())],
        );
        Ok(graph)
    }
}
