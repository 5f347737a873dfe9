use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// An untyped scalar read from a tabular source.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// Builds a cell from raw text; blank text becomes [`CellValue::Missing`].
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Missing
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Returns the text content, or `None` for numbers and missing cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Number(_) | Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            Self::Missing => Ok(()),
        }
    }
}

/// One row of a dataset: the player key plus opaque pass-through payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub key: CellValue,
    pub payload: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(key: CellValue) -> Self {
        Self {
            key,
            payload: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.payload.insert(column.into(), value);
        self
    }

    /// Payload cell for a column, treating absent columns as missing.
    pub fn cell(&self, column: &str) -> &CellValue {
        static MISSING: CellValue = CellValue::Missing;
        self.payload.get(column).unwrap_or(&MISSING)
    }
}

/// A table read from one source export.
///
/// Only the key column carries meaning for matching; every other column is
/// carried through to the merge untouched, in source order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    /// Short label used in logs and as the column suffix when merging.
    pub label: String,
    /// Name of the column holding player names.
    pub key_column: String,
    /// Payload column names in source order (key column excluded).
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(
        label: impl Into<String>,
        key_column: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            label: label.into(),
            key_column: key_column.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct text player names in first-seen order.
    ///
    /// Rows whose key is missing or numeric contribute nothing here; they
    /// can never be matched and are dropped by the merge.
    pub fn player_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for record in &self.records {
            if let Some(name) = record.key.as_text()
                && seen.insert(name)
            {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Records whose key equals `name` exactly.
    pub fn records_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .iter()
            .filter(move |record| record.key.as_text() == Some(name))
    }

    /// Player names that appear on more than one row.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            if let Some(name) = record.key.as_text() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Number of rows whose key is not usable text.
    pub fn keyless_rows(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.key.as_text().is_none())
            .count()
    }
}
