use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{JournalError, Result};
use crate::records::Record;
use crate::util::file_timestamp;

/// Whole-collection JSON snapshot at a fixed path.
///
/// The document is `{"<R::KEY>": [record, ...]}`. Every save rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonStore<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> JsonStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serializes `records` and overwrites the file.
    pub fn save_all(&self, records: &[R]) -> Result<()> {
        let mut doc = Map::new();
        doc.insert(R::KEY.to_string(), serde_json::to_value(records)?);
        let json = serde_json::to_string_pretty(&Value::Object(doc))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// `Ok(None)` when there is no file yet.
    pub fn load_all(&self) -> Result<Option<Vec<R>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut doc: Value = serde_json::from_str(&content)?;
        let list = doc
            .get_mut(R::KEY)
            .map(Value::take)
            .ok_or_else(|| JournalError::Custom(format!("missing \"{}\" array", R::KEY)))?;
        // Older writers stored an unset list as null
        if list.is_null() {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(serde_json::from_value(list)?))
    }

    /// Removes the file if present.
    pub fn delete_all(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves the backing file to `new_path` and points the store there.
    /// A missing file just retargets the store.
    pub fn rename_to(&mut self, new_path: impl Into<PathBuf>) -> Result<()> {
        let new_path = new_path.into();
        if self.path.exists() {
            if new_path.exists() {
                return Err(JournalError::Custom(format!(
                    "{} already exists",
                    new_path.display()
                )));
            }
            if let Some(parent) = new_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::rename(&self.path, &new_path)?;
        }
        self.path = new_path;
        Ok(())
    }

    /// Moves an unreadable file aside as `<stem>.corrupt-<timestamp>.json`
    /// and returns where it went.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "data".into());
        let target = self
            .path
            .with_file_name(format!("{stem}.corrupt-{}.json", file_timestamp()));
        std::fs::rename(&self.path, &target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{NoteRecord, PlaceRecord, TripRecord};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let store: JsonStore<TripRecord> = JsonStore::new(dir.path().join("SavedTripsData.json"));
        assert!(store.load_all().unwrap().is_none());
    }

    #[test]
    fn test_trips_document_layout() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("SavedTripsData.json"));
        store
            .save_all(&[TripRecord::new("Paris", "Vacation", "01.01.2025")])
            .unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            json!({"Trips": [{"Name": "Paris", "Description": "Vacation", "Date": "01.01.2025"}]})
        );
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("NotesData.json"));
        let notes = vec![
            NoteRecord::new("Pack charger", "03.05.2025"),
            NoteRecord::new("Check visa", "01.05.2025"),
        ];
        store.save_all(&notes).unwrap();
        assert_eq!(store.load_all().unwrap(), Some(notes));

        store.save_all(&[]).unwrap();
        assert_eq!(store.load_all().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NotesData.json");
        std::fs::write(&path, "{\"NoteDataList\": [").unwrap();
        let store: JsonStore<NoteRecord> = JsonStore::new(&path);
        assert!(matches!(store.load_all(), Err(JournalError::Json(_))));

        std::fs::write(&path, "{\"Other\": []}").unwrap();
        assert!(matches!(store.load_all(), Err(JournalError::Custom(_))));
    }

    #[test]
    fn test_delete_all() {
        let dir = tempdir().unwrap();
        let store: JsonStore<PlaceRecord> = JsonStore::new(dir.path().join("Paris.json"));
        store.delete_all().unwrap();
        store.save_all(&[]).unwrap();
        assert!(store.exists());
        store.delete_all().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn test_rename_to() {
        let dir = tempdir().unwrap();
        let mut store = JsonStore::new(dir.path().join("Paris.json"));
        let places = vec![PlaceRecord::new("Louvre", "Museum", "02.01.2025")];
        store.save_all(&places).unwrap();

        store.rename_to(dir.path().join("Lyon.json")).unwrap();
        assert!(!dir.path().join("Paris.json").exists());
        assert_eq!(store.load_all().unwrap(), Some(places));
    }

    #[test]
    fn test_quarantine_moves_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SavedTripsData.json");
        std::fs::write(&path, "not json").unwrap();
        let store: JsonStore<TripRecord> = JsonStore::new(&path);

        let moved = store.quarantine().unwrap();
        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(&moved).unwrap(), "not json");
        let name = moved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("SavedTripsData.corrupt-"));
    }
}
