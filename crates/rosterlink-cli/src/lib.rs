//! CLI library components for rosterlink.

pub mod logging;
pub mod review;
pub mod summary;
pub mod types;
