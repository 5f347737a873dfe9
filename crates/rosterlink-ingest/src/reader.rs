//! CSV roster reading into keyed datasets.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};
use rosterlink_model::{CellValue, Dataset, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{IngestError, Result};

/// Default name of the player column.
pub const DEFAULT_KEY_COLUMN: &str = "Player";

/// Column names accepted as the player key when the requested one is absent.
const KEY_ALIASES: &[&str] = &["player", "player name", "name", "short name"];

/// Options for reading a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Column holding player names (default: `Player`).
    pub key_column: String,
    /// Rows used for schema inference (default: 100).
    pub infer_schema_length: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            infer_schema_length: Some(100),
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }
}

/// Reads a CSV roster into a [`Dataset`].
///
/// The label defaults to the file stem. The key column is looked up by
/// exact name, then case-insensitively, then through the usual aliases
/// (`Player Name`, `Name`, `Short Name`).
pub fn read_dataset(path: &Path, label: Option<&str>, options: &ReadOptions) -> Result<Dataset> {
    ensure_not_empty(path)?;
    let df = read_frame(path, options)?;
    let label = label.map_or_else(|| default_label(path), str::to_string);

    let columns = clean_column_names(&df);
    let key_idx = resolve_key_column(&columns, &options.key_column).ok_or_else(|| {
        IngestError::KeyColumnNotFound {
            requested: options.key_column.clone(),
            path: path.to_path_buf(),
            available: columns.join(", "),
        }
    })?;

    let dataset = dataset_from_frame(&df, &label, key_idx)?;
    debug!(
        path = %path.display(),
        label = %dataset.label,
        key_column = %dataset.key_column,
        rows = dataset.len(),
        columns = dataset.columns.len(),
        "loaded roster"
    );
    report_key_quality(&dataset);
    Ok(dataset)
}

/// Builds a dataset from a frame, using the column at `key_idx` as the key.
pub fn dataset_from_frame(df: &DataFrame, label: &str, key_idx: usize) -> Result<Dataset> {
    let names = clean_column_names(df);
    let frame_columns = df.get_columns();
    let key_column = names.get(key_idx).cloned().ok_or_else(|| IngestError::DataFrame {
        message: format!("key column index {key_idx} out of range"),
    })?;
    let payload: Vec<String> = names
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != key_idx)
        .map(|(_, name)| name.clone())
        .collect();

    let mut dataset = Dataset::new(label, key_column, payload);
    for row_idx in 0..df.height() {
        let key = any_to_cell(frame_columns[key_idx].get(row_idx)?);
        let mut record = Record::new(key);
        for (col_idx, column) in frame_columns.iter().enumerate() {
            if col_idx == key_idx {
                continue;
            }
            record = record.with_cell(names[col_idx].clone(), any_to_cell(column.get(row_idx)?));
        }
        dataset.push_record(record);
    }
    Ok(dataset)
}

/// Finds the key column: exact, case-insensitive, then known aliases.
pub fn resolve_key_column<S: AsRef<str>>(columns: &[S], requested: &str) -> Option<usize> {
    let requested = requested.trim();
    if let Some(idx) = columns.iter().position(|c| c.as_ref() == requested) {
        return Some(idx);
    }
    if let Some(idx) = columns
        .iter()
        .position(|c| c.as_ref().eq_ignore_ascii_case(requested))
    {
        return Some(idx);
    }
    KEY_ALIASES.iter().find_map(|alias| {
        columns
            .iter()
            .position(|c| c.as_ref().trim().eq_ignore_ascii_case(alias))
    })
}

/// Converts a Polars value into an untyped cell.
pub fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::String(s) => CellValue::from_text(s),
        AnyValue::StringOwned(s) => CellValue::from_text(s.as_str()),
        AnyValue::Int8(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int16(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int32(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int64(v) => CellValue::Number(v as f64),
        AnyValue::UInt8(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt16(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt32(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt64(v) => CellValue::Number(v as f64),
        AnyValue::Float32(v) => number_or_missing(f64::from(v)),
        AnyValue::Float64(v) => number_or_missing(v),
        AnyValue::Boolean(b) => CellValue::Text(b.to_string()),
        other => CellValue::from_text(&other.to_string()),
    }
}

fn number_or_missing(value: f64) -> CellValue {
    if value.is_nan() {
        CellValue::Missing
    } else {
        CellValue::Number(value)
    }
}

fn read_frame(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Column names with surrounding whitespace and a leading BOM removed.
fn clean_column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.as_str().trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

/// Fails with `EmptyCsv` when the file has no content besides whitespace.
fn ensure_not_empty(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut buffer = [0u8; 64];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let head = buffer[..bytes_read]
        .strip_prefix(b"\xEF\xBB\xBF".as_slice())
        .unwrap_or(&buffer[..bytes_read]);
    if head.iter().all(u8::is_ascii_whitespace) && bytes_read < buffer.len() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn default_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

fn report_key_quality(dataset: &Dataset) {
    let duplicates = dataset.duplicate_keys();
    if !duplicates.is_empty() {
        warn!(
            label = %dataset.label,
            count = duplicates.len(),
            "player names repeated on several rows; merged rows will be multiplied"
        );
        trace!(label = %dataset.label, names = ?duplicates, "duplicate player names");
    }
    let keyless = dataset.keyless_rows();
    if keyless > 0 {
        warn!(
            label = %dataset.label,
            rows = keyless,
            "rows without a player name cannot be matched"
        );
    }
}
