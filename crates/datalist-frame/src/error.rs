//! Error types for the polars-backed source.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while reading or querying a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A configured column does not exist in the frame.
    #[error("column '{column}' not found in frame")]
    MissingColumn { column: String },

    /// Query execution failed.
    #[error("query failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;
