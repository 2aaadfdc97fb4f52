//! Pure application of a [`VersionEdit`] to a snapshot
//!
//! Operations run in a fixed order: remove, then add, then update. The old
//! snapshot is never mutated; the result is a fresh value that has passed
//! [`Snapshot::validate`].

use std::collections::BTreeMap;

use crate::errors::{LexiconError, LexiconResult};
use crate::store::{HistoryEvent, Snapshot, Translations};

use super::edit::{AddOps, UpdateOps, VersionEdit};

/// Build the snapshot that follows `old`.
///
/// `old_name` keys the diff entries recorded by this edit and `new_name`
/// keys its history entries. Both entries are always created, possibly
/// empty. `languages` are the configured languages every renamed term must be
/// translated in.
///
/// # Errors
///
/// - `DuplicateRule` when an added inhibition or translation already exists
/// - `Corruption` when a rename source lacks a configured translation
/// - `InvariantViolation` when a rename source is not a term, or the
///   produced snapshot breaks a cross-field invariant
pub fn apply_edit(
    old: &Snapshot,
    old_name: &str,
    new_name: &str,
    edit: &VersionEdit,
    languages: &[String],
) -> LexiconResult<Snapshot> {
    let mut state = Draft {
        snapshot: old.clone(),
        old_name,
        new_name,
    };

    let seeded = edit.diff.clone().unwrap_or_default();
    state.snapshot.diff.entry(old_name.to_string()).or_default().extend(seeded);
    state.snapshot.history.entry(new_name.to_string()).or_default();

    if let Some(remove) = &edit.remove {
        state.remove(remove);
    }
    if let Some(add) = &edit.add {
        state.add(add)?;
    }
    if let Some(update) = &edit.update {
        state.update(update, languages)?;
    }

    state.snapshot.validate()?;
    Ok(state.snapshot)
}

struct Draft<'a> {
    snapshot: Snapshot,
    old_name: &'a str,
    new_name: &'a str,
}

impl Draft<'_> {
    fn record_diff(&mut self, term: &str, to: Option<String>) {
        self.snapshot
            .diff
            .entry(self.old_name.to_string())
            .or_default()
            .insert(term.to_string(), to);
    }

    fn record_history(&mut self, term: &str, event: HistoryEvent) {
        self.snapshot
            .history
            .entry(self.new_name.to_string())
            .or_default()
            .insert(term.to_string(), event);
    }

    fn remove(&mut self, terms: &[String]) {
        for term in terms {
            self.snapshot.terms.remove(term);
            self.snapshot.roots.remove(term);
            self.snapshot.inhibitions.remove(term);
            for glosses in self.snapshot.translations.values_mut() {
                glosses.remove(term);
            }
            self.record_diff(term, None);
            self.record_history(term, HistoryEvent::Removed);
        }
    }

    fn add(&mut self, add: &AddOps) -> LexiconResult<()> {
        for term in add.terms.iter().chain(&add.roots) {
            self.snapshot.terms.insert(term.clone());
            self.record_history(term, HistoryEvent::Added);
        }
        self.snapshot.roots.extend(add.roots.iter().cloned());

        let clashing: Vec<&str> = add
            .inhibitions
            .keys()
            .filter(|root| self.snapshot.inhibitions.contains_key(*root))
            .map(String::as_str)
            .collect();
        if !clashing.is_empty() {
            return Err(LexiconError::DuplicateRule(format!(
                "inhibition rules already exist for {}",
                clashing.join(", ")
            )));
        }

        let mut clashing = Vec::new();
        for (language, glosses) in &add.translations {
            if let Some(existing) = self.snapshot.translations.get(language) {
                clashing.extend(
                    glosses
                        .keys()
                        .filter(|term| existing.contains_key(*term))
                        .map(|term| format!("{}:{}", language, term)),
                );
            }
        }
        if !clashing.is_empty() {
            return Err(LexiconError::DuplicateRule(format!(
                "translations already exist for {}",
                clashing.join(", ")
            )));
        }

        self.snapshot
            .inhibitions
            .extend(add.inhibitions.iter().map(|(k, v)| (k.clone(), v.clone())));
        merge_translations(&mut self.snapshot, &add.translations);
        Ok(())
    }

    fn update(&mut self, update: &UpdateOps, languages: &[String]) -> LexiconResult<()> {
        for (root, kinds) in &update.inhibitions {
            if let Some(existing) = self.snapshot.inhibitions.get_mut(root) {
                *existing = kinds.clone();
            }
        }

        merge_translations(&mut self.snapshot, &update.translations);

        if !update.terms.is_empty() {
            self.rename(&update.terms, languages)?;
        }
        Ok(())
    }

    /// Renames are applied as a batch, so swaps (`A -> B`, `B -> A`) carry
    /// their translations and inhibitions correctly.
    fn rename(&mut self, renames: &BTreeMap<String, String>, languages: &[String]) -> LexiconResult<()> {
        for old in renames.keys() {
            if !self.snapshot.terms.contains(old) {
                return Err(LexiconError::InvariantViolation(format!(
                    "cannot rename {} which is not a term",
                    old
                )));
            }
            for language in languages {
                let translated = self
                    .snapshot
                    .translations
                    .get(language)
                    .is_some_and(|glosses| glosses.contains_key(old));
                if !translated {
                    return Err(LexiconError::Corruption(format!(
                        "renamed term {} has no {} translation",
                        old, language
                    )));
                }
            }
        }

        let mut renamed_roots = Vec::new();
        let mut inhibitions = Vec::new();
        let mut glosses = Vec::new();
        for old in renames.keys() {
            self.snapshot.terms.remove(old);
            if self.snapshot.roots.remove(old) {
                renamed_roots.push(old);
            }
            if let Some(kinds) = self.snapshot.inhibitions.remove(old) {
                inhibitions.push((old, kinds));
            }
            for (language, by_term) in self.snapshot.translations.iter_mut() {
                if let Some(gloss) = by_term.remove(old) {
                    glosses.push((language.clone(), old, gloss));
                }
            }
        }

        for (old, new) in renames {
            self.snapshot.terms.insert(new.clone());
            self.record_history(old, HistoryEvent::Removed);
            self.record_history(new, HistoryEvent::Added);
            self.record_diff(old, Some(new.clone()));
        }
        for old in renamed_roots {
            self.snapshot.roots.insert(renames[old].clone());
        }
        for (old, kinds) in inhibitions {
            self.snapshot.inhibitions.insert(renames[old].clone(), kinds);
        }
        for (language, old, gloss) in glosses {
            self.snapshot
                .translations
                .entry(language)
                .or_default()
                .insert(renames[old].clone(), gloss);
        }
        Ok(())
    }
}

fn merge_translations(snapshot: &mut Snapshot, additions: &Translations) {
    for (language, glosses) in additions {
        snapshot
            .translations
            .entry(language.clone())
            .or_default()
            .extend(glosses.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}
