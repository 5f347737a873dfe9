use std::io::Write;

use rosterlink_ingest::{IngestError, ReadOptions, read_dataset};
use rosterlink_model::CellValue;
use tempfile::{NamedTempFile, TempDir};

fn create_temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn reads_key_and_payload() {
    let file = create_temp_csv(
        "Player,Team,Minutes\nMohamed Salah,Liverpool,2890\nRodri,Manchester City,3011\n",
    );
    let dataset = read_dataset(file.path(), Some("wyscout"), &ReadOptions::default()).unwrap();

    assert_eq!(dataset.label, "wyscout");
    assert_eq!(dataset.key_column, "Player");
    assert_eq!(dataset.columns, vec!["Team", "Minutes"]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.player_names(), vec!["Mohamed Salah", "Rodri"]);

    let salah = &dataset.records[0];
    assert_eq!(salah.cell("Team"), &CellValue::Text("Liverpool".to_string()));
    assert_eq!(salah.cell("Minutes"), &CellValue::Number(2890.0));
}

#[test]
fn key_column_is_case_insensitive_and_overridable() {
    let file = create_temp_csv("PLAYER,Short Name\nMohamed Salah,M. Salah\n");
    let dataset = read_dataset(file.path(), None, &ReadOptions::default()).unwrap();
    assert_eq!(dataset.key_column, "PLAYER");

    let options = ReadOptions::default().with_key_column("Short Name");
    let dataset = read_dataset(file.path(), None, &options).unwrap();
    assert_eq!(dataset.key_column, "Short Name");
    assert_eq!(dataset.player_names(), vec!["M. Salah"]);
}

#[test]
fn missing_key_column_is_reported() {
    let file = create_temp_csv("Team,Minutes\nLiverpool,90\n");
    let err = read_dataset(file.path(), None, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::KeyColumnNotFound { .. }));
    assert!(err.to_string().contains("Team, Minutes"));
}

#[test]
fn empty_file_is_rejected() {
    let file = create_temp_csv("");
    let err = read_dataset(file.path(), None, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = read_dataset(
        &dir.path().join("absent.csv"),
        None,
        &ReadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn label_defaults_to_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("physical.csv");
    std::fs::write(&path, "Player,Distance\nMo Salah,10.4\n").unwrap();
    let dataset = read_dataset(&path, None, &ReadOptions::default()).unwrap();
    assert_eq!(dataset.label, "physical");
    assert_eq!(dataset.records[0].cell("Distance"), &CellValue::Number(10.4));
}

#[test]
fn blank_cells_and_duplicates() {
    let file = create_temp_csv("Player,Team\nRodri,\n,Arsenal\nRodri,Real Betis\n");
    let dataset = read_dataset(file.path(), None, &ReadOptions::default()).unwrap();
    assert_eq!(dataset.len(), 3);
    assert!(dataset.records[0].cell("Team").is_missing());
    assert_eq!(dataset.keyless_rows(), 1);
    assert_eq!(dataset.duplicate_keys(), vec!["Rodri"]);
    assert_eq!(dataset.player_names(), vec!["Rodri"]);
}
