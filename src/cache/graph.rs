//! Derived relation graph and the collaborator that computes it

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LexiconError;
use crate::store::{Inhibitions, TermSet};
use crate::version::VersionId;

/// Relations derived from a version's terms, roots and inhibitions.
///
/// `relations[term][kind]` lists the terms related to `term` by `kind`.
/// Two graphs built from the same inputs differ only in `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationGraph {
    /// Name of the version the graph belongs to
    pub version: String,
    pub relations: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl RelationGraph {
    pub fn new(version: VersionId) -> Self {
        Self {
            version: version.name(),
            relations: BTreeMap::new(),
        }
    }

    /// Record `source -kind-> target`
    pub fn relate(&mut self, source: &str, kind: &str, target: &str) {
        self.relations
            .entry(source.to_string())
            .or_default()
            .entry(kind.to_string())
            .or_default()
            .push(target.to_string());
    }

    /// Targets related to `term` by `kind`
    pub fn related(&self, term: &str, kind: &str) -> &[String] {
        self.relations
            .get(term)
            .and_then(|kinds| kinds.get(kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every term that appears as a relation source
    pub fn sources(&self) -> BTreeSet<&str> {
        self.relations.keys().map(String::as_str).collect()
    }
}

/// Rejection of a term/root/inhibition set by the graph engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoherenceError {
    pub message: String,
}

impl CoherenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoherenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CoherenceError {}

impl From<CoherenceError> for LexiconError {
    fn from(e: CoherenceError) -> Self {
        LexiconError::Coherence(e.message)
    }
}

/// Engine that computes relation graphs.
///
/// Building is expensive and validates coherence; cloning is cheap and is
/// only valid when terms, roots and inhibitions are unchanged.
pub trait RelationGraphEngine: Send + Sync {
    fn build_relation_graph(
        &self,
        version: VersionId,
        terms: &TermSet,
        roots: &TermSet,
        inhibitions: &Inhibitions,
    ) -> Result<RelationGraph, CoherenceError>;

    /// Copy `graph` for another version with identical graph inputs.
    fn clone_relation_graph(&self, graph: &RelationGraph, version: VersionId) -> RelationGraph {
        RelationGraph {
            version: version.name(),
            relations: graph.relations.clone(),
        }
    }
}
