//! Merged roster output.
//!
//! Joins the primary roster with each secondary roster through its
//! confirmed name mapping, then writes the result as CSV. Match decisions
//! can be saved and reloaded as JSON.

mod error;
mod merge;
mod writer;

pub use error::{OutputError, Result};
pub use merge::{JoinKind, JoinStats, MergeOptions, MergedTable, merge};
pub use writer::{MappingExport, read_mapping_json, to_frame, write_csv, write_mapping_json};
