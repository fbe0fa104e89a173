//! Collecting BibTeX files into a persisted store.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::bibtex::{parse_bibtex, ParseError};
use crate::normalize::customize;
use crate::paths::{create_parent_dir, walk_files};
use crate::record::Collection;
use crate::store::{load_existing, merge, save_store, StoreError};

/// Extension of the files read as BibTeX.
pub const BIB_EXTENSION: &str = "bib";

/// Errors that can occur while collecting references.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("'{}': no such file or directory", .0.display())]
    InputNotFound(PathBuf),

    #[error("'{}': {}", .path.display(), .source)]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}': {}", .path.display(), .source)]
    ParseError { path: PathBuf, source: ParseError },

    #[error("Failed to walk input directory: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("'{}': failed to create output directory: {}", .path.display(), .source)]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}': {}", .path.display(), .source)]
    StoreError { path: PathBuf, source: StoreError },
}

/// Outcome of one collector run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// BibTeX files parsed
    pub files: usize,
    /// Files skipped for their extension
    pub skipped: usize,
    /// References read from the input
    pub parsed: usize,
    /// References in the store after merging
    pub stored: usize,
}

/// Accumulates parsed references and file counts across a walk.
#[derive(Debug, Default)]
struct Loaded {
    references: Collection,
    files: usize,
    skipped: usize,
}

/// Parses a BibTeX file, or every file under a directory, into a collection.
///
/// Files without the `.bib` extension are skipped with a notice. When two
/// files of a directory define the same identifier, the file read last wins;
/// the walk order is unspecified.
pub fn load_bibtex(path: &Path) -> Result<Collection, CollectError> {
    Ok(load_tree(path)?.references)
}

fn load_tree(path: &Path) -> Result<Loaded, CollectError> {
    if !path.exists() {
        return Err(CollectError::InputNotFound(path.to_path_buf()));
    }

    let mut loaded = Loaded::default();
    for file in walk_files(path) {
        let file = file?;
        if !has_bib_extension(&file) {
            info!("Skipping {} - No .bib extension.", file.display());
            loaded.skipped += 1;
            continue;
        }
        let references = load_bib_file(&file)?;
        debug!("read {} reference(s) from {}", references.len(), file.display());
        loaded.references.extend(references);
        loaded.files += 1;
    }
    Ok(loaded)
}

fn has_bib_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == BIB_EXTENSION)
}

/// Reads and normalizes a single BibTeX file.
pub fn load_bib_file(path: &Path) -> Result<Collection, CollectError> {
    let content = fs::read_to_string(path).map_err(|source| CollectError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_bibtex(&content).map_err(|source| CollectError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.into_iter().map(customize).collect())
}

/// Collects references from `bib` into the store at `outfile`.
///
/// The store is created when missing or unreadable, otherwise the new
/// references are merged over the stored ones.
pub fn bibtex2dict(bib: &Path, outfile: &Path) -> Result<CollectSummary, CollectError> {
    create_parent_dir(outfile).map_err(|source| CollectError::OutputDir {
        path: outfile.to_path_buf(),
        source,
    })?;

    let existing = load_existing(outfile);
    let loaded = load_tree(bib)?;
    let parsed = loaded.references.len();

    let merged = merge(existing, loaded.references);
    save_store(outfile, &merged).map_err(|source| CollectError::StoreError {
        path: outfile.to_path_buf(),
        source,
    })?;

    let summary = CollectSummary {
        files: loaded.files,
        skipped: loaded.skipped,
        parsed,
        stored: merged.len(),
    };
    info!(
        "collected {} reference(s) from {} file(s), store {} holds {}",
        summary.parsed,
        summary.files,
        outfile.display(),
        summary.stored
    );
    Ok(summary)
}
