//! Operation bundles accepted by the version builder

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{Inhibitions, Translations};

/// Additions. Terms and roots are unioned in; inhibitions and translations
/// must not already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddOps {
    pub terms: Vec<String>,
    pub roots: Vec<String>,
    pub inhibitions: Inhibitions,
    pub translations: Translations,
}

/// Updates. `terms` is a rename map (old code -> new code).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOps {
    pub terms: BTreeMap<String, String>,
    pub inhibitions: Inhibitions,
    pub translations: Translations,
}

/// A full edit of one version into the next.
///
/// ```json
/// {
///   "remove": ["B"],
///   "add": {"terms": ["C"], "translations": {"en": {"C": "gamma"}}},
///   "update": {"terms": {"A": "A2"}}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionEdit {
    pub add: Option<AddOps>,
    pub update: Option<UpdateOps>,
    pub remove: Option<Vec<String>>,
    /// Extra entries seeded into the old version's diff before any operation
    pub diff: Option<BTreeMap<String, Option<String>>>,
}

impl VersionEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_add(mut self, add: AddOps) -> Self {
        self.add = Some(add);
        self
    }

    pub fn with_update(mut self, update: UpdateOps) -> Self {
        self.update = Some(update);
        self
    }

    pub fn with_remove<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_diff(mut self, diff: BTreeMap<String, Option<String>>) -> Self {
        self.diff = Some(diff);
        self
    }

    /// Whether the edit carries no operation at all
    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.update.is_none() && self.remove.is_none() && self.diff.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_deserializes() {
        let edit: VersionEdit = serde_json::from_str(
            r#"{"add": {"terms": ["C"], "translations": {"en": {"C": "gamma"}}}, "remove": ["B"]}"#,
        )
        .unwrap();

        let add = edit.add.as_ref().unwrap();
        assert_eq!(add.terms, vec!["C".to_string()]);
        assert!(add.roots.is_empty());
        assert_eq!(edit.remove, Some(vec!["B".to_string()]));
        assert!(edit.update.is_none());
    }

    #[test]
    fn test_empty_edit() {
        assert!(VersionEdit::new().is_empty());
        assert!(!VersionEdit::new().with_remove(["B"]).is_empty());
    }
}
