//! CSV and JSON writers for merged output.

use std::fs::{self, File};
use std::path::Path;

use chrono::Utc;
use polars::prelude::{Column, CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use rosterlink_model::{CellValue, ConfirmedMapping};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{OutputError, Result};
use crate::merge::MergedTable;

/// On-disk form of saved match decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingExport {
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    pub mappings: Vec<ConfirmedMapping>,
}

/// Converts a merged table into a DataFrame.
///
/// Columns whose present cells are all whole numbers become `Int64`, other
/// all-numeric columns `Float64`, everything else `String`.
pub fn to_frame(table: &MergedTable) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&CellValue> = table.rows.iter().map(|row| &row[idx]).collect();
            column_from_cells(name, &cells)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn column_from_cells(name: &str, cells: &[&CellValue]) -> Column {
    let present = || cells.iter().filter(|cell| !cell.is_missing());
    let numeric = cells.iter().any(|cell| !cell.is_missing())
        && present().all(|cell| matches!(cell, CellValue::Number(_)));

    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| match cell {
                CellValue::Number(v) => Some(*v),
                CellValue::Text(_) | CellValue::Missing => None,
            })
            .collect();
        let whole = values
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < 1e15);
        if whole {
            let ints: Vec<Option<i64>> = values.iter().map(|v| v.map(|v| v as i64)).collect();
            return Series::new(name.into(), ints).into();
        }
        return Series::new(name.into(), values).into();
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| (!cell.is_missing()).then(|| cell.to_string()))
        .collect();
    Series::new(name.into(), values).into()
}

/// Writes the merged table as CSV with a header row.
pub fn write_csv(table: &MergedTable, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut df = to_frame(table)?;
    let mut file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "wrote merged CSV"
    );
    Ok(())
}

/// Writes confirmed mappings as pretty JSON.
pub fn write_mapping_json(mappings: &[ConfirmedMapping], path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let export = MappingExport {
        exported_at: Utc::now().to_rfc3339(),
        mappings: mappings.to_vec(),
    };
    let json = serde_json::to_string_pretty(&export).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), mappings = mappings.len(), "wrote mapping JSON");
    Ok(())
}

/// Reads mappings written by [`write_mapping_json`].
pub fn read_mapping_json(path: &Path) -> Result<Vec<ConfirmedMapping>> {
    let contents = fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let export: MappingExport =
        serde_json::from_str(&contents).map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(export.mappings)
}

/// Ensure a parent directory exists for a file path.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
