//! Roster ingestion.
//!
//! Loads CSV exports into [`rosterlink_model::Dataset`] values: one key
//! column holding player names plus the remaining columns as opaque payload.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rosterlink_ingest::{ReadOptions, read_dataset};
//!
//! let options = ReadOptions::default().with_key_column("Short Name");
//! let physical = read_dataset(Path::new("data/physical.csv"), None, &options)?;
//! println!("{} rows from {}", physical.len(), physical.label);
//! ```

mod error;
mod reader;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use reader::{
    DEFAULT_KEY_COLUMN, ReadOptions, any_to_cell, dataset_from_frame, read_dataset,
    resolve_key_column,
};
