//! BibTeX reader.
//!
//! Turns BibTeX source into raw entries: an identifier, an entry type and
//! the field values as written in the file, with `@string` abbreviations
//! expanded and `#` concatenations joined. The grammar itself is handled by
//! `biblatex`'s raw layer, which keeps field names in their original case
//! and leaves LaTeX markup alone. Values are normalized later, see
//! [`crate::normalize`].

use std::collections::{BTreeMap, HashMap};

use biblatex::{RawBibliography, RawChunk, Spanned};
use thiserror::Error;

/// A syntax error in BibTeX source.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line where the reader stopped
    pub line: usize,
    pub message: String,
}

/// One `@type{key, name = value, ...}` entry as read from the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEntry {
    /// The citation identifier
    pub key: String,
    /// Lowercased entry type (e.g. "article", "inproceedings")
    pub entry_type: String,
    /// Field values by field name, names kept in their original case
    pub fields: BTreeMap<String, String>,
}

/// Parses BibTeX source into its entries, in source order.
///
/// `@string` blocks define abbreviations used by later values; names are
/// matched ignoring case and an unknown abbreviation (a month name, mostly)
/// stays as written. A field given twice in one entry keeps its last value.
///
/// # Examples
///
/// ```
/// use bib_tools::bibtex::parse_bibtex;
///
/// let entries = parse_bibtex(r#"@article{doe2021, title = {A Title}, year = 2021}"#).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].key, "doe2021");
/// assert_eq!(entries[0].fields["year"], "2021");
/// ```
pub fn parse_bibtex(src: &str) -> Result<Vec<RawEntry>, ParseError> {
    let raw = RawBibliography::parse(src).map_err(|e| ParseError {
        line: line_at(src, e.span.start),
        message: e.kind.to_string(),
    })?;

    let mut strings = HashMap::new();
    for pair in &raw.abbreviations {
        let value = expand(&pair.value.v, &strings);
        strings.insert(pair.key.v.to_lowercase(), value);
    }

    let entries = raw
        .entries
        .iter()
        .map(|entry| RawEntry {
            key: entry.v.key.v.to_string(),
            entry_type: entry.v.kind.v.to_lowercase(),
            fields: entry
                .v
                .fields
                .iter()
                .map(|pair| (pair.key.v.to_string(), expand(&pair.value.v, &strings)))
                .collect(),
        })
        .collect();

    Ok(entries)
}

/// Joins the pieces of a value, replacing abbreviations by their text.
fn expand(chunks: &[Spanned<RawChunk>], strings: &HashMap<String, String>) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            RawChunk::Normal(text) => text.to_string(),
            RawChunk::Abbreviation(name) => strings
                .get(&name.to_lowercase())
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        })
        .collect()
}

/// 1-indexed line holding byte `offset` of `src`.
fn line_at(src: &str, offset: usize) -> usize {
    let end = offset.min(src.len());
    src.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
