use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use rosterlink_map::{Classification, NameScore, PreparedName};
use rosterlink_output::JoinStats;

use crate::types::MatchReport;

pub fn print_summary(reports: &[MatchReport]) {
    println!("{}", summary_table(reports));
    if let Some(table) = unresolved_table(reports) {
        println!();
        println!("Needs review:");
        println!("{table}");
    }
}

/// Per-dataset counts with a totals row.
pub fn summary_table(reports: &[MatchReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Names"),
        header_cell("Auto"),
        header_cell("Confirmed"),
        header_cell("Rejected"),
        header_cell("Suggested"),
        header_cell("Unmatched"),
    ]);
    apply_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = [0usize; 6];
    for report in reports {
        let counts = [
            report.sources,
            report.auto,
            report.confirmed,
            report.rejected,
            report.suggested,
            report.unmatched,
        ];
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
        table.add_row(vec![
            Cell::new(format!("{} -> {}", report.label, report.target_label))
                .add_attribute(Attribute::Bold),
            Cell::new(report.sources),
            count_cell(report.auto, Color::Green),
            count_cell(report.confirmed, Color::Green),
            count_cell(report.rejected, Color::DarkGrey),
            count_cell(report.suggested, Color::Yellow),
            count_cell(report.unmatched, Color::Red),
        ]);
    }

    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        totals
            .iter()
            .map(|total| Cell::new(total).add_attribute(Attribute::Bold)),
    );
    table.add_row(total_row);
    table
}

/// Pending names with their suggestions, or `None` when nothing is pending.
pub fn unresolved_table(reports: &[MatchReport]) -> Option<Table> {
    if reports.iter().all(|report| report.unresolved.is_empty()) {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Name"),
        header_cell("Status"),
        header_cell("Suggestion"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for report in reports {
        for name in &report.unresolved {
            table.add_row(vec![
                Cell::new(&report.label),
                Cell::new(&name.name),
                classification_cell(name.classification),
                match &name.suggestion {
                    Some(target) => Cell::new(target),
                    None => dim_cell("-"),
                },
                Cell::new(format!("{}%", name.score_percent)),
            ]);
        }
    }
    Some(table)
}

pub fn print_join_stats(stats: &[JoinStats], rows: usize, output: &Path) {
    println!("Merged {rows} rows into {}", output.display());
    for stat in stats {
        println!(
            "  {}: {} linked rows, {} unlinked rows dropped, {} primary rows without a match",
            stat.label, stat.linked_rows, stat.unlinked_rows, stat.unmatched_primary_rows
        );
    }
}

pub fn print_score(left: &PreparedName, right: &PreparedName, score: &NameScore) {
    let mut table = Table::new();
    table.set_header(vec![header_cell(""), header_cell(&left.raw), header_cell(&right.raw)]);
    apply_table_style(&mut table);
    table.add_row(vec![
        dim_cell("normalized"),
        Cell::new(&left.normalized.full),
        Cell::new(&right.normalized.full),
    ]);
    table.add_row(vec![
        dim_cell("variations"),
        Cell::new(join_set(left.variations.iter())),
        Cell::new(join_set(right.variations.iter())),
    ]);
    println!("{table}");
    println!("Score: {:.3} ({})", score.score, score.explain());
}

fn join_set<'a>(values: impl Iterator<Item = &'a String>) -> String {
    values.map(String::as_str).collect::<Vec<_>>().join("\n")
}

fn classification_cell(classification: Classification) -> Cell {
    match classification {
        Classification::Auto => Cell::new("auto").fg(Color::Green),
        Classification::Suggested => Cell::new("suggested").fg(Color::Yellow),
        Classification::Unmatched => Cell::new("unmatched").fg(Color::Red),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
