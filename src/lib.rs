//! bib-tools: collect BibTeX references into a JSON store and export them as CSV.
//!
//! This library provides functionality to:
//! - Parse BibTeX files, or whole directories of them, into reference records
//! - Normalize field values (unicode, name lists, page ranges)
//! - Merge references into a persisted store across runs
//! - Project stored references into CSV rows and append them to a file

pub mod bibtex;
pub mod collect;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod paths;
pub mod record;
pub mod rows;
pub mod store;

pub use collect::{bibtex2dict, load_bibtex, CollectError, CollectSummary};
pub use export::{dict2csv, ExportError};
pub use normalize::customize;
pub use output::append_rows;
pub use record::{Collection, Reference};
pub use rows::{dict2rows, Row};
pub use store::{load_existing, load_store, merge, save_store, Existing};
