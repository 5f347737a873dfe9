//! Error types for merged output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing merged output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create or write a file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping JSON could not be encoded or decoded.
    #[error("invalid mapping JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for OutputError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("Player".into());
        let err: OutputError = polars_err.into();
        assert!(matches!(err, OutputError::DataFrame { .. }));
        assert!(err.to_string().starts_with("DataFrame operation failed"));
    }
}
