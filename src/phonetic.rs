//! Phonetic aliases for term codes
//!
//! A phonetic reduction strips the layer marks from a term code. Reductions
//! that collide are disambiguated with a numeric suffix: `form`, `form.1`,
//! `form.2`, ordered by the version that introduced the term and then by the
//! layer of the term.

use std::collections::BTreeMap;

use crate::store::History;

/// Layer marks, indexed by layer (0 to 6).
pub const LAYER_MARKS: [char; 7] = [':', '.', '-', '\'', ',', '_', ';'];

/// Strip every layer mark from `term`.
pub fn phonetic(term: &str) -> String {
    term.chars().filter(|c| !LAYER_MARKS.contains(c)).collect()
}

/// Layer of a term, read from its final mark. Unmarked terms sort last.
pub fn layer_of(term: &str) -> usize {
    term.chars()
        .last()
        .and_then(|c| LAYER_MARKS.iter().position(|m| *m == c))
        .unwrap_or(LAYER_MARKS.len())
}

/// Alias -> term mapping over every term the history mentions.
pub fn phonetic_mapping(history: &History) -> BTreeMap<String, String> {
    let mut by_form: BTreeMap<String, Vec<(usize, &str)>> = BTreeMap::new();
    for (index, terms) in history.values().enumerate() {
        for term in terms.keys() {
            by_form
                .entry(phonetic(term))
                .or_default()
                .push((index, term.as_str()));
        }
    }

    let mut mapping = BTreeMap::new();
    for (form, mut candidates) in by_form {
        if candidates.len() == 1 {
            mapping.insert(form, candidates[0].1.to_string());
            continue;
        }

        candidates.sort_by_key(|(index, term)| (*index, layer_of(term)));
        for (rank, (_, term)) in candidates.into_iter().enumerate() {
            let key = if rank == 0 {
                form.clone()
            } else {
                format!("{}.{}", form, rank)
            };
            mapping.insert(key, term.to_string());
        }
    }
    mapping
}
