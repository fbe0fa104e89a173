//! CSV output.
//!
//! Rows are appended to the output file; existing rows are never rewritten,
//! so exporting the same store twice writes its rows twice.

use std::fs::OpenOptions;
use std::path::Path;

use thiserror::Error;

use crate::paths::create_parent_dir;
use crate::rows::Row;

/// Errors that can occur when writing rows.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to open output file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] csv::Error),
}

/// Appends rows to the CSV file at `path`, creating it and its directory
/// when missing. No header row is written.
///
/// Fields containing commas, quotes or line breaks are quoted.
pub fn append_rows(path: &Path, rows: &[Row]) -> Result<(), OutputError> {
    create_parent_dir(path)?;

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
