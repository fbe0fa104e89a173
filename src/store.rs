//! Persisted reference store.
//!
//! A store is a JSON object mapping citation identifiers to references. It
//! is read at the start of a run and replaced as a whole at the end of it.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::record::Collection;

/// Errors that can occur when reading or writing a store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid store content: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    PersistError(#[from] tempfile::PersistError),
}

/// What was found at a store path before merging.
#[derive(Debug, Clone, PartialEq)]
pub enum Existing {
    Loaded(Collection),
    /// Nothing usable: the file is missing, unreadable or corrupt
    Absent,
}

impl Existing {
    pub fn into_collection(self) -> Collection {
        match self {
            Existing::Loaded(collection) => collection,
            Existing::Absent => Collection::new(),
        }
    }
}

/// Loads a store, failing if it is missing or not a valid store.
pub fn load_store(path: &Path) -> Result<Collection, StoreError> {
    let content = fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Loads a store to merge into. Any failure counts as [`Existing::Absent`].
pub fn load_existing(path: &Path) -> Existing {
    match load_store(path) {
        Ok(collection) => Existing::Loaded(collection),
        Err(e) => {
            debug!("starting from an empty store, '{}': {}", path.display(), e);
            Existing::Absent
        }
    }
}

/// Merges fresh references over existing ones.
///
/// Identifiers present in both take the fresh reference as a whole; fields
/// are never merged individually.
pub fn merge(existing: Existing, fresh: Collection) -> Collection {
    let mut merged = existing.into_collection();
    merged.extend(fresh);
    merged
}

/// Writes a store, replacing any previous content.
///
/// The new content is written to a temporary file next to `path` and moved
/// into place, so an interrupted write leaves the previous store intact.
/// An existing store keeps its permissions; a new one gets the default
/// file mode. The parent directory must already exist.
pub fn save_store(path: &Path, collection: &Collection) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let json = serde_json::to_string_pretty(collection)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    if let Some(permissions) = store_permissions(path)? {
        file.as_file().set_permissions(permissions)?;
    }
    file.persist(path)?;
    Ok(())
}

/// Permissions for the store at `path`: the current ones if it exists.
fn store_permissions(path: &Path) -> io::Result<Option<Permissions>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Reference;
    use tempfile::TempDir;

    fn reference(title: &str, year: &str) -> Reference {
        Reference {
            entry_type: "misc".to_string(),
            title: Some(title.to_string()),
            year: Some(year.to_string()),
            ..Default::default()
        }
    }

    fn collection(items: &[(&str, Reference)]) -> Collection {
        items
            .iter()
            .map(|(id, r)| (id.to_string(), r.clone()))
            .collect()
    }

    // --- load_store / save_store ---

    #[test]
    fn test_save_then_load_store() {
        // Given: a collection written to disk
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        let refs = collection(&[("id1", reference("Foo", "2020"))]);
        save_store(&path, &refs).unwrap();

        // When: we load it again
        let loaded = load_store(&path).unwrap();

        // Then: the same collection comes back
        assert_eq!(loaded, refs);
    }

    #[test]
    fn test_save_store_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        save_store(&path, &collection(&[("old", reference("Old", "1999"))])).unwrap();

        save_store(&path, &collection(&[("new", reference("New", "2024"))])).unwrap();

        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("new"));
    }

    #[test]
    fn test_save_store_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");

        save_store(&path, &Collection::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("refs.json")]);
    }

    #[test]
    fn test_load_store_file_not_found() {
        let result = load_store(Path::new("/nonexistent/path/refs.json"));
        assert!(matches!(result, Err(StoreError::IoError(_))));
    }

    #[test]
    fn test_load_store_corrupt_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        fs::write(&path, "{ not a store").unwrap();

        let result = load_store(&path);

        assert!(matches!(result, Err(StoreError::JsonError(_))));
    }

    #[test]
    fn test_load_store_invalid_utf8_is_a_content_error() {
        // Given: a store file holding bytes that are not UTF-8
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        fs::write(&path, b"\xff\xfe{\"id1\": {}}").unwrap();

        // When: we load it
        let result = load_store(&path);

        // Then: it is reported as bad content, not as an unreadable file
        assert!(matches!(result, Err(StoreError::JsonError(_))));
    }

    #[test]
    fn test_load_store_rejects_wrong_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        fs::write(&path, r#"["id1", "id2"]"#).unwrap();

        assert!(load_store(&path).is_err());
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_save_store_new_file_gets_default_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");

        save_store(&path, &Collection::new()).unwrap();

        assert_eq!(mode(&path), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_store_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        // Given: existing stores with 0644 and 0640 modes
        let dir = TempDir::new().unwrap();
        for wanted in [0o644, 0o640] {
            let path = dir.path().join(format!("refs-{:o}.json", wanted));
            save_store(&path, &Collection::new()).unwrap();
            fs::set_permissions(&path, Permissions::from_mode(wanted)).unwrap();

            // When: the store is saved again
            save_store(&path, &collection(&[("id1", reference("Foo", "2020"))])).unwrap();

            // Then: the mode is unchanged
            assert_eq!(mode(&path), wanted);
        }
    }

    // --- load_existing ---

    #[test]
    fn test_load_existing_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_existing(&dir.path().join("none.json")), Existing::Absent);
    }

    #[test]
    fn test_load_existing_corrupt_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        fs::write(&path, "{ truncated").unwrap();

        assert_eq!(load_existing(&path), Existing::Absent);
    }

    #[test]
    fn test_load_existing_valid_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.json");
        let refs = collection(&[("id1", reference("Foo", "2020"))]);
        save_store(&path, &refs).unwrap();

        assert_eq!(load_existing(&path), Existing::Loaded(refs));
    }

    // --- merge ---

    #[test]
    fn test_merge_keeps_all_identifiers() {
        // Given: an existing store and fresh references sharing one identifier
        let existing = Existing::Loaded(collection(&[
            ("a", reference("A", "2000")),
            ("shared", reference("Old title", "2001")),
        ]));
        let fresh = collection(&[
            ("shared", reference("New title", "2002")),
            ("b", reference("B", "2003")),
        ]);

        // When: we merge
        let merged = merge(existing, fresh);

        // Then: the union of identifiers is present
        let ids: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "shared"]);
        assert_eq!(merged["shared"], reference("New title", "2002"));
    }

    #[test]
    fn test_merge_replaces_whole_records() {
        // Given: an old record with a field the fresh one lacks
        let mut old = reference("Old", "2001");
        old.pages = Some("1--2".to_string());
        let existing = Existing::Loaded(collection(&[("id", old)]));
        let fresh = collection(&[("id", reference("New", "2002"))]);

        // When: we merge
        let merged = merge(existing, fresh);

        // Then: no field of the old record survives
        assert_eq!(merged["id"].pages, None);
        assert_eq!(merged["id"].title.as_deref(), Some("New"));
    }

    #[test]
    fn test_merge_into_absent() {
        let fresh = collection(&[("id1", reference("Foo", "2020"))]);
        assert_eq!(merge(Existing::Absent, fresh.clone()), fresh);
    }

    #[test]
    fn test_merge_same_data_is_idempotent() {
        let refs = collection(&[("id1", reference("Foo", "2020"))]);
        let once = merge(Existing::Absent, refs.clone());
        let twice = merge(Existing::Loaded(once.clone()), refs);
        assert_eq!(once, twice);
    }
}
