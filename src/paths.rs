//! Filesystem helpers: walking input trees and creating output directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Lists every file under `root`, lazily.
///
/// A file root yields itself. The order in which files come out is
/// unspecified and may differ between platforms or runs.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => Some(Ok(entry.into_path())),
            Err(e) => Some(Err(e)),
        })
}

/// Creates `dir` and any missing ancestors. An existing directory is fine.
pub fn create_directory(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Creates the directory that will hold `path`.
pub fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) => create_directory(dir),
        None => Ok(()),
    }
}
