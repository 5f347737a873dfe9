//! Identity join of a primary roster with linked secondary rosters.

use std::collections::{BTreeMap, BTreeSet};

use rosterlink_model::{CellValue, ConfirmedMapping, Dataset, Record};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How primary rows without a linked secondary row are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// Drop the primary row.
    #[default]
    Inner,
    /// Keep the primary row with missing secondary cells.
    Left,
}

/// Options for [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub join: JoinKind,
    /// Suffix every secondary column with its dataset label, not just the
    /// colliding ones.
    pub suffix_all: bool,
}

impl MergeOptions {
    #[must_use]
    pub fn left() -> Self {
        Self {
            join: JoinKind::Left,
            ..Self::default()
        }
    }
}

/// Per-secondary join statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub label: String,
    /// Secondary rows linked to a primary name.
    pub linked_rows: usize,
    /// Secondary rows dropped for lack of a confirmed mapping.
    pub unlinked_rows: usize,
    /// Primary rows (after previous joins) with no linked secondary row.
    pub unmatched_primary_rows: usize,
}

/// Result of a merge: a rectangular table of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    /// Column names; the first one is the primary key column.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub stats: Vec<JoinStats>,
}

impl MergedTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// Joins `primary` with each secondary dataset through its mapping.
///
/// Each mapping links secondary names (sources) to primary names
/// (targets). Secondaries are joined one after another in the given order.
/// A primary name linked to several secondary rows yields one output row
/// per combination.
pub fn merge(
    primary: &Dataset,
    secondaries: &[(&Dataset, &ConfirmedMapping)],
    options: &MergeOptions,
) -> MergedTable {
    let mut columns = Vec::with_capacity(1 + primary.columns.len());
    columns.push(primary.key_column.clone());
    columns.extend(primary.columns.iter().cloned());

    let mut rows: Vec<(Option<String>, Vec<CellValue>)> = primary
        .records
        .iter()
        .map(|record| {
            let mut cells = Vec::with_capacity(columns.len());
            cells.push(record.key.clone());
            cells.extend(primary.columns.iter().map(|c| record.cell(c).clone()));
            (record.key.as_text().map(str::to_string), cells)
        })
        .collect();

    let mut stats = Vec::with_capacity(secondaries.len());
    for (secondary, mapping) in secondaries {
        let mut taken: BTreeSet<String> = columns.iter().cloned().collect();
        let renamed: Vec<String> = secondary
            .columns
            .iter()
            .map(|name| {
                let output = output_column_name(name, &secondary.label, &taken, options.suffix_all);
                taken.insert(output.clone());
                output
            })
            .collect();
        columns.extend(renamed);

        let (index, mut join_stats) = index_by_target(secondary, mapping);
        let width = secondary.columns.len();
        let mut joined = Vec::with_capacity(rows.len());
        for (key, cells) in rows {
            match key.as_deref().and_then(|k| index.get(k)) {
                Some(linked) => {
                    for record in linked {
                        let mut row = cells.clone();
                        row.extend(secondary.columns.iter().map(|c| record.cell(c).clone()));
                        joined.push((key.clone(), row));
                    }
                }
                None => {
                    join_stats.unmatched_primary_rows += 1;
                    if options.join == JoinKind::Left {
                        let mut row = cells;
                        row.extend(std::iter::repeat_n(CellValue::Missing, width));
                        joined.push((key, row));
                    }
                }
            }
        }
        rows = joined;

        if join_stats.unlinked_rows > 0 {
            warn!(
                label = %join_stats.label,
                rows = join_stats.unlinked_rows,
                "secondary rows without a confirmed match were dropped"
            );
        }
        debug!(
            label = %join_stats.label,
            linked = join_stats.linked_rows,
            unmatched_primary = join_stats.unmatched_primary_rows,
            rows = rows.len(),
            "joined secondary"
        );
        stats.push(join_stats);
    }

    info!(
        primary = %primary.label,
        secondaries = secondaries.len(),
        rows = rows.len(),
        columns = columns.len(),
        "merge complete"
    );
    MergedTable {
        columns,
        rows: rows.into_iter().map(|(_, cells)| cells).collect(),
        stats,
    }
}

/// Groups secondary records under the primary name they are linked to.
fn index_by_target<'a>(
    secondary: &'a Dataset,
    mapping: &ConfirmedMapping,
) -> (BTreeMap<String, Vec<&'a Record>>, JoinStats) {
    let mut stats = JoinStats {
        label: secondary.label.clone(),
        ..JoinStats::default()
    };
    let mut index: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for record in &secondary.records {
        match record.key.as_text().and_then(|name| mapping.target_for(name)) {
            Some(target) => {
                index.entry(target.to_string()).or_default().push(record);
                stats.linked_rows += 1;
            }
            None => stats.unlinked_rows += 1,
        }
    }
    (index, stats)
}

fn output_column_name(
    name: &str,
    label: &str,
    taken: &BTreeSet<String>,
    suffix_all: bool,
) -> String {
    if !suffix_all && !taken.contains(name) {
        return name.to_string();
    }
    let base = format!("{name}_{label}");
    let mut candidate = base.clone();
    let mut counter = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}_{counter}");
        counter += 1;
    }
    candidate
}
