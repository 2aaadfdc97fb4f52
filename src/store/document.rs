//! JSON document shape of a persisted snapshot
//!
//! Format:
//! ```json
//! {
//!   "version": "2024-03-01_12:30:05",
//!   "terms": ["A", "B"],
//!   "roots": ["A"],
//!   "inhibitions": { "A": ["father"] },
//!   "translations": { "en": { "A": "alpha", "B": "beta" } },
//!   "diff": { "dictionary_2024-02-01_08:00:00": { "Z": "B" } },
//!   "history": { "dictionary_2024-03-01_12:30:05": { "B": "+" } }
//! }
//! ```
//!
//! `diff` and `history` are optional on input. `history` is always written.

use serde::{Deserialize, Serialize};

use crate::errors::{LexiconError, LexiconResult};
use crate::version::VersionId;

use super::snapshot::{Diff, History, Inhibitions, Snapshot, TermSet, Translations};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Canonical date string of the version
    pub version: String,
    pub terms: TermSet,
    pub roots: TermSet,
    pub inhibitions: Inhibitions,
    pub translations: Translations,
    #[serde(default)]
    pub diff: Option<Diff>,
    #[serde(default)]
    pub history: Option<History>,
}

impl SnapshotDocument {
    pub fn from_snapshot(id: VersionId, snapshot: &Snapshot) -> Self {
        Self {
            version: id.date_string(),
            terms: snapshot.terms.clone(),
            roots: snapshot.roots.clone(),
            inhibitions: snapshot.inhibitions.clone(),
            translations: snapshot.translations.clone(),
            diff: Some(snapshot.diff.clone()),
            history: Some(snapshot.history.clone()),
        }
    }

    /// Parse a document.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the bytes are not a well-formed document.
    pub fn from_slice(bytes: &[u8]) -> LexiconResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| LexiconError::Corruption(format!("malformed snapshot document: {}", e)))
    }

    pub fn to_json(&self) -> LexiconResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LexiconError::Corruption(format!("cannot encode snapshot: {}", e)))
    }

    /// Convert into the snapshot of `expected`, applying the
    /// backward-compatibility fallbacks for `diff` and `history`.
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the document describes another version.
    pub fn into_snapshot(self, expected: VersionId) -> LexiconResult<Snapshot> {
        let declared = VersionId::parse(&self.version).map_err(|_| {
            LexiconError::Corruption(format!("unparseable version field {:?}", self.version))
        })?;
        if declared != expected {
            return Err(LexiconError::Corruption(format!(
                "document declares {} but was loaded as {}",
                declared, expected
            )));
        }

        let history = match self.history {
            Some(history) => history,
            None => Snapshot::synthetic_history(&expected.name(), &self.terms),
        };

        Ok(Snapshot {
            terms: self.terms,
            roots: self.roots,
            inhibitions: self.inhibitions,
            translations: self.translations,
            diff: self.diff.unwrap_or_default(),
            history,
        })
    }
}
