//! CSV loading.

use std::path::Path;

use polars::prelude::*;

use crate::error::{FrameError, Result};
use crate::source::FrameSource;

/// Reads a CSV file with a single header row into a `DataFrame`.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(FrameError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| FrameError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| FrameError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Read CSV"
    );
    Ok(df)
}

/// Reads a CSV file into a [`FrameSource`].
pub fn read_csv_source(path: &Path) -> Result<FrameSource> {
    FrameSource::from_frame(read_csv(path)?)
}
