//! Persisted key/value storage for the client session
//!
//! This module provides the storage seam the session manager writes through.
//! It mirrors browser local storage: string keys mapped to string values,
//! surviving restarts when file-backed. Writes and removals take a batch of
//! keys and apply them as a single operation, so a token and its cached
//! profile can never be observed half-written.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Key/value backend for persisted session state
pub trait SessionStore: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Get several keys from a single read, in the order asked
    fn get_all(&self, keys: &[&str]) -> StorageResult<Vec<Option<String>>>;

    /// Set every entry in one operation
    fn set_all(&self, entries: &[(&str, String)]) -> StorageResult<()>;

    /// Set every entry, but only while `key` still holds `expected`
    ///
    /// Returns `false` and writes nothing when the value has changed or
    /// been removed since it was read.
    fn set_all_if(
        &self,
        key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> StorageResult<bool>;

    /// Remove every key in one operation; missing keys are ignored
    fn remove_all(&self, keys: &[&str]) -> StorageResult<()>;
}

fn insert_all(map: &mut BTreeMap<String, String>, entries: &[(&str, String)]) {
    for (key, value) in entries {
        map.insert((*key).to_string(), value.clone());
    }
}

fn holds(map: &BTreeMap<String, String>, key: &str, expected: &str) -> bool {
    map.get(key).map(String::as_str) == Some(expected)
}

/// In-memory store, used by tests and short-lived processes
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn get_all(&self, keys: &[&str]) -> StorageResult<Vec<Option<String>>> {
        let map = self.entries.lock();
        Ok(keys.iter().map(|key| map.get(*key).cloned()).collect())
    }

    fn set_all(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        insert_all(&mut self.entries.lock(), entries);
        Ok(())
    }

    fn set_all_if(
        &self,
        key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> StorageResult<bool> {
        let mut map = self.entries.lock();
        if !holds(&map, key, expected) {
            return Ok(false);
        }
        insert_all(&mut map, entries);
        Ok(true)
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let mut map = self.entries.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// File-backed store holding a single JSON object of string values
///
/// Every write replaces the file through a sibling temporary file and a
/// rename, so readers see either the old or the new contents.
///
/// ```rust,no_run
/// use common::{ClientConfig, FileStore, SessionStore};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let store = FileStore::open(&config.session_file);
///     println!("Stored user: {:?}", store.get("user")?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`; the file is created on first write
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Session storage at {}", path.display());
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Format),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StorageError::Io)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(map).map_err(StorageError::Format)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes).map_err(StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(StorageError::Io)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn get_all(&self, keys: &[&str]) -> StorageResult<Vec<Option<String>>> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        Ok(keys.iter().map(|key| map.remove(*key)).collect())
    }

    fn set_all(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        insert_all(&mut map, entries);
        self.write_map(&map)
    }

    fn set_all_if(
        &self,
        key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if !holds(&map, key, expected) {
            return Ok(false);
        }
        insert_all(&mut map, entries);
        self.write_map(&map)?;
        Ok(true)
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_set_get_remove() -> StorageResult<()> {
        let store = MemoryStore::new();
        store.set_all(&[("token", "abc".to_string()), ("user", "{}".to_string())])?;

        assert_eq!(store.get("token")?, Some("abc".to_string()));
        assert_eq!(store.len(), 2);

        store.remove_all(&["token", "user", "missing"])?;
        assert_eq!(store.get("token")?, None);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_store_survives_reopen() -> StorageResult<()> {
        let dir = tempfile::tempdir().map_err(StorageError::Io)?;
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path);
        assert_eq!(store.get("token")?, None);
        store.set_all(&[
            ("token", "abc".to_string()),
            ("user", "{\"id\":\"1\"}".to_string()),
        ])?;

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("token")?, Some("abc".to_string()));
        assert_eq!(reopened.get("user")?, Some("{\"id\":\"1\"}".to_string()));

        reopened.remove_all(&["token", "user"])?;
        assert_eq!(FileStore::open(&path).get("user")?, None);
        Ok(())
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").expect("write");

        let store = FileStore::open(&path);
        assert!(matches!(store.get("token"), Err(StorageError::Format(_))));
    }

    #[test]
    fn test_get_all_reads_in_order() -> StorageResult<()> {
        let store = MemoryStore::new();
        store.set_all(&[("user", "{}".to_string())])?;

        assert_eq!(
            store.get_all(&["token", "user"])?,
            vec![None, Some("{}".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_set_all_if_requires_current_value() -> StorageResult<()> {
        let dir = tempfile::tempdir().map_err(StorageError::Io)?;
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path);
        store.set_all(&[("token", "old".to_string()), ("user", "a".to_string())])?;

        let entries = [("token", "old".to_string()), ("user", "b".to_string())];
        assert!(store.set_all_if("token", "old", &entries)?);
        assert_eq!(store.get("user")?, Some("b".to_string()));

        store.remove_all(&["token", "user"])?;
        assert!(!store.set_all_if("token", "old", &entries)?);
        assert_eq!(store.get_all(&["token", "user"])?, vec![None, None]);
        assert!(!MemoryStore::new().set_all_if("token", "old", &entries)?);
        Ok(())
    }

    #[test]
    fn test_remove_on_missing_file_is_noop() -> StorageResult<()> {
        let dir = tempfile::tempdir().map_err(StorageError::Io)?;
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path);

        store.remove_all(&["token", "user"])?;
        assert!(!path.exists());
        Ok(())
    }
}
