use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scored pairing between a source name and a target name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub source_name: String,
    pub target_name: String,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

/// Read-only snapshot of the decisions taken for one source dataset.
///
/// `matches` maps each confirmed source name to the target name it was
/// linked to. No target appears twice among the values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedMapping {
    /// Label of the dataset the source names come from.
    pub source_label: String,
    /// Label of the dataset the target names come from.
    pub target_label: String,
    pub matches: BTreeMap<String, String>,
    /// Source names explicitly marked as having no counterpart.
    #[serde(default)]
    pub rejected: Vec<String>,
}

impl ConfirmedMapping {
    pub fn new(source_label: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            target_label: target_label.into(),
            matches: BTreeMap::new(),
            rejected: Vec::new(),
        }
    }

    pub fn target_for(&self, source: &str) -> Option<&str> {
        self.matches.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
