//! Exporting a persisted store to CSV.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::output::{append_rows, OutputError};
use crate::rows::{dict2rows, RowError};
use crate::store::{load_store, StoreError};

/// Errors that can occur while exporting.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("'{}': {}", .path.display(), .source)]
    StoreError { path: PathBuf, source: StoreError },

    #[error(transparent)]
    RowError(#[from] RowError),

    #[error("'{}': {}", .path.display(), .source)]
    OutputError { path: PathBuf, source: OutputError },
}

/// Appends one CSV row per reference of the store at `dict` to `outfile`.
///
/// Unlike the collector, a missing or unreadable store is an error.
/// Returns the number of rows written.
pub fn dict2csv(dict: &Path, outfile: &Path) -> Result<usize, ExportError> {
    let references = load_store(dict).map_err(|source| ExportError::StoreError {
        path: dict.to_path_buf(),
        source,
    })?;

    let rows = dict2rows(&references)?;

    append_rows(outfile, &rows).map_err(|source| ExportError::OutputError {
        path: outfile.to_path_buf(),
        source,
    })?;

    info!("appended {} row(s) to {}", rows.len(), outfile.display());
    Ok(rows.len())
}
