//! Projection of references into CSV rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{Collection, Reference};

/// Errors that can occur when projecting references.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Reference '{id}' has no '{field}' field")]
    MissingField { id: String, field: &'static str },
}

/// One CSV row. Columns are written in declaration order.
///
/// Only `title`, `year` and `url` are filled from a reference; the other
/// columns are left for manual editing downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub title: String,
    pub year: String,
    pub tags: String,
    pub group: String,
    pub url: String,
    pub venue: String,
    pub notes: String,
}

impl Row {
    /// Column names, in order.
    pub const COLUMNS: [&'static str; 7] = ["Title", "Year", "Tags", "Group", "URL", "Venue", "Notes"];

    /// Projects one reference. `title` and `year` are required.
    pub fn from_reference(id: &str, reference: &Reference) -> Result<Self, RowError> {
        let required = |value: &Option<String>, field| {
            value.clone().ok_or_else(|| RowError::MissingField {
                id: id.to_string(),
                field,
            })
        };

        Ok(Row {
            title: required(&reference.title, "title")?,
            year: required(&reference.year, "year")?,
            url: reference.link().unwrap_or_default().to_string(),
            ..Default::default()
        })
    }
}

/// Projects every reference of a collection, in the collection's order.
pub fn dict2rows(references: &Collection) -> Result<Vec<Row>, RowError> {
    references
        .iter()
        .map(|(id, reference)| Row::from_reference(id, reference))
        .collect()
}
