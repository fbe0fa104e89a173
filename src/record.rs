//! Reference records and collections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// References keyed by citation identifier.
pub type Collection = BTreeMap<String, Reference>;

/// One bibliographic reference.
///
/// The fields the tools act on are typed; every other BibTeX field is kept
/// verbatim in [`Reference::fields`]. `url` and `URL` are distinct source
/// fields and are only reconciled when a link is asked for, see
/// [`Reference::link`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    /// Lowercased BibTeX entry type
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Names in `Last, First` form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url_upper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    /// Fields without a typed slot
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Reference {
    /// Builds a reference from named field values.
    ///
    /// Names are matched case-sensitively. The normalization pipeline takes
    /// `author` and `editor` out as name lists before calling this; when a
    /// caller passes them in directly, each value becomes a one-name list.
    pub fn from_fields(entry_type: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        let mut reference = Reference {
            entry_type: entry_type.into(),
            ..Default::default()
        };

        for (name, value) in fields {
            match name.as_str() {
                "title" => reference.title = Some(value),
                "year" => reference.year = Some(value),
                "author" => reference.author = Some(vec![value]),
                "editor" => reference.editor = Some(vec![value]),
                "url" => reference.url = Some(value),
                "URL" => reference.url_upper = Some(value),
                "pages" => reference.pages = Some(value),
                _ => {
                    reference.fields.insert(name, value);
                }
            }
        }

        reference
    }

    /// The reference's link: `url` when set, otherwise `URL`.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().or(self.url_upper.as_deref())
    }
}
