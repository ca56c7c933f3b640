//! Key-value stores for persisted records

use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Name of the document holding every record inside the state directory
pub const STATE_FILE: &str = "state.json";

/// Simple JSON key-value storage.
///
/// `save` writes a whole set of records: either every record of the set
/// lands or none does.
pub trait StateStore: Send {
    fn save(&mut self, records: &[(&str, Value)]) -> Result<(), StoreError>;
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

/// All records in one pretty-printed JSON object inside a directory.
///
/// A save goes to a temporary file first and is renamed over the previous
/// document, so a reader sees either the old set or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{}.tmp", STATE_FILE))
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, StoreError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode { path, source })
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl StateStore for FileStore {
    fn save(&mut self, records: &[(&str, Value)]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let document: Map<String, Value> = records
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        let data = serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Encode {
            key: STATE_FILE.to_string(),
            source,
        })?;

        let temp = self.temp_path();
        write_synced(&temp, &data).map_err(|source| StoreError::Io {
            path: temp.clone(),
            source,
        })?;
        let path = self.path();
        fs::rename(&temp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read_document()?
            .and_then(|mut document| document.remove(key)))
    }
}

/// Map-backed store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value back without going through the trait
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().ok().and_then(|values| values.get(key).cloned())
    }

    /// Seed a raw value, e.g. a corrupted record
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }
}

impl StateStore for MemoryStore {
    fn save(&mut self, records: &[(&str, Value)]) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Failed to lock store: {}", e)))?;
        for (key, value) in records {
            values.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Failed to lock store: {}", e)))?;
        Ok(values.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrip_creates_directory() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        let value = json!({ "sessionsCompleted": 2, "running": false, "remaining": 1000 });
        store
            .save(&[("focusTimer", value.clone()), ("breakTimer", json!(null))])
            .unwrap();
        assert_eq!(store.load("focusTimer").unwrap(), Some(value));
        assert_eq!(store.load("endingProjection").unwrap(), None);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn file_store_missing_document_is_absent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load("breakTimer").unwrap(), None);
    }

    #[test]
    fn file_store_garbage_is_an_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.path(), b"{not json").unwrap();
        assert_matches!(store.load("endingProjection"), Err(StoreError::Decode { .. }));
    }

    #[test]
    fn failed_save_keeps_previous_set() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store
            .save(&[("focusTimer", json!(1)), ("breakTimer", json!(1))])
            .unwrap();

        // A directory in the way makes the temporary write fail.
        fs::create_dir(store.temp_path()).unwrap();
        assert_matches!(
            store.save(&[("focusTimer", json!(2)), ("breakTimer", json!(2))]),
            Err(StoreError::Io { .. })
        );
        assert_eq!(store.load("focusTimer").unwrap(), Some(json!(1)));
        assert_eq!(store.load("breakTimer").unwrap(), Some(json!(1)));
    }

    #[test]
    fn leftover_temporary_file_is_ignored() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.save(&[("focusTimer", json!(1))]).unwrap();
        fs::write(store.temp_path(), b"{\"focusTimer\": 2").unwrap();
        assert_eq!(store.load("focusTimer").unwrap(), Some(json!(1)));
    }

    #[test]
    fn memory_store_clones_share_values() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save(&[("k", json!(1))]).unwrap();
        assert_eq!(store.get("k"), Some(json!(1)));
    }
}
