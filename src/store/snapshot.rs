//! In-memory snapshot of one dictionary version

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{LexiconError, LexiconResult};
use crate::phonetic;

/// Set of term codes
pub type TermSet = BTreeSet<String>;

/// root code -> relation kinds suppressed for that root
pub type Inhibitions = BTreeMap<String, Vec<String>>;

/// language code -> term code -> gloss
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// version name -> old term -> new term (`None` = removed)
pub type Diff = BTreeMap<String, BTreeMap<String, Option<String>>>;

/// version name -> term -> event
pub type History = BTreeMap<String, BTreeMap<String, HistoryEvent>>;

/// What happened to a term in a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryEvent {
    #[serde(rename = "+")]
    Added,
    #[serde(rename = "-")]
    Removed,
}

/// Materialized fields of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub terms: TermSet,
    pub roots: TermSet,
    pub inhibitions: Inhibitions,
    pub translations: Translations,
    pub diff: Diff,
    pub history: History,
}

impl Snapshot {
    /// Synthetic history for snapshots written before history tracking:
    /// every term counts as added in this version.
    pub fn synthetic_history(version_name: &str, terms: &TermSet) -> History {
        let added = terms
            .iter()
            .map(|t| (t.clone(), HistoryEvent::Added))
            .collect();
        BTreeMap::from([(version_name.to_string(), added)])
    }

    /// Check the cross-field invariants.
    ///
    /// - `roots ⊆ terms`
    /// - inhibition keys ⊆ roots
    /// - every language's translation keys ⊆ terms
    pub fn validate(&self) -> LexiconResult<()> {
        if let Some(root) = self.roots.iter().find(|r| !self.terms.contains(*r)) {
            return Err(LexiconError::InvariantViolation(format!(
                "root {} is not a term",
                root
            )));
        }

        if let Some(key) = self.inhibitions.keys().find(|k| !self.roots.contains(*k)) {
            return Err(LexiconError::InvariantViolation(format!(
                "inhibition rule for {} which is not a root paradigm",
                key
            )));
        }

        for (language, glosses) in &self.translations {
            if let Some(term) = glosses.keys().find(|t| !self.terms.contains(*t)) {
                return Err(LexiconError::InvariantViolation(format!(
                    "{} translation for {} which is not a term",
                    language, term
                )));
            }
        }

        Ok(())
    }

    /// Whether the relation graph inputs (terms, roots, inhibitions) match.
    pub fn same_graph_inputs(&self, other: &Snapshot) -> bool {
        self.terms == other.terms
            && self.roots == other.roots
            && self.inhibitions == other.inhibitions
    }

    /// Human-friendly aliases derived from the history (alias -> term).
    pub fn phonetic_mapping(&self) -> BTreeMap<String, String> {
        phonetic::phonetic_mapping(&self.history)
    }

    /// Gloss of `term` in `language`
    pub fn translation(&self, language: &str, term: &str) -> Option<&str> {
        self.translations
            .get(language)
            .and_then(|glosses| glosses.get(term))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> TermSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn valid() -> Snapshot {
        Snapshot {
            terms: set(&["A", "B"]),
            roots: set(&["A"]),
            inhibitions: BTreeMap::from([("A".to_string(), vec!["father".to_string()])]),
            translations: BTreeMap::from([(
                "en".to_string(),
                BTreeMap::from([("A".to_string(), "alpha".to_string())]),
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_root_outside_terms_rejected() {
        let mut snapshot = valid();
        snapshot.roots.insert("Z".into());
        let err = snapshot.validate().unwrap_err();
        assert_eq!(err.code(), "LEX_INVARIANT_VIOLATION");
    }

    #[test]
    fn test_inhibition_outside_roots_rejected() {
        let mut snapshot = valid();
        snapshot.inhibitions.insert("B".into(), vec![]);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_translation_outside_terms_rejected() {
        let mut snapshot = valid();
        snapshot
            .translations
            .entry("fr".into())
            .or_default()
            .insert("Q".into(), "q".into());
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_history_event_serialization() {
        assert_eq!(serde_json::to_string(&HistoryEvent::Added).unwrap(), "\"+\"");
        assert_eq!(serde_json::to_string(&HistoryEvent::Removed).unwrap(), "\"-\"");
    }

    #[test]
    fn test_same_graph_inputs_ignores_translations() {
        let a = valid();
        let mut b = valid();
        b.translations.clear();
        b.history.insert("v".into(), BTreeMap::new());
        assert!(a.same_graph_inputs(&b));
        b.inhibitions.clear();
        assert!(!a.same_graph_inputs(&b));
    }
}
