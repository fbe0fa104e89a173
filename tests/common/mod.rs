//! Shared test inputs and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// One reference with only a title and a year.
pub const FOO_BIB: &str = r#"@misc{id1,
  title = {Foo},
  year = {2020}
}
"#;

/// Three references exercising names, page ranges and both link spellings.
pub const LIBRARY_BIB: &str = r#"@string{nat = {Nature}}

@article{lecun2015,
  author = {Yann LeCun and Yoshua Bengio and Geoffrey Hinton},
  title = {Deep learning},
  journal = nat,
  year = {2015},
  pages = {436-444},
  url = {https://doi.org/10.1038/nature14539}
}

@book{knuth1984,
  author = {Knuth, Donald E.},
  editor = {Jane Roe},
  title = {The {TeX}book},
  year = 1984,
  URL = {https://example.org/texbook}
}

@misc{noname,
  title = {Untitled {N}otes},
  year = {1999},
  pages = {1--2}
}
"#;

/// Writes `content` to `dir/name`, creating intermediate directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Reads a header-less CSV file into records.
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}
