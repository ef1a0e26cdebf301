//! Session-scoped key-value storage.
//!
//! Values are plain JSON text under a handful of well-known keys. The
//! in-memory backend lives as long as the process; the file backend keeps one
//! file per key in a session directory so separate CLI invocations share a
//! session until it is reset.

use crate::error::StorageError;
use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key holding the serialized tasks/contacts/users cache.
pub const CACHE_KEY: &str = "joinCache";

/// Key holding the logged-in user record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Key holding the task snapshot used by the summary view.
pub const SUMMARY_TASKS_KEY: &str = "summaryTasks";

/// Browser-session-like storage of JSON strings.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    /// Drop every key.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Storage that lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".into()))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Storage backed by a directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Open (and create if needed) a session directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Whole-value replace: write a sibling temp file, then rename over.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json" || ext == "tmp") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Read and deserialize a JSON value stored under `key`.
pub fn load_json<T: serde::de::DeserializeOwned>(
    storage: &dyn SessionStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get_item(key)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Serialize a value as JSON and store it under `key`.
pub fn save_json<T: serde::Serialize>(
    storage: &dyn SessionStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(value)?;
    storage.set_item(key, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get_item(CACHE_KEY).unwrap(), None);
        storage.set_item(CACHE_KEY, "{}").unwrap();
        assert_eq!(storage.get_item(CACHE_KEY).unwrap().as_deref(), Some("{}"));
        storage.remove_item(CACHE_KEY).unwrap();
        assert_eq!(storage.get_item(CACHE_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_persists_between_handles() {
        let temp = TempDir::new().unwrap();
        let first = FileSessionStorage::open(temp.path().join("session")).unwrap();
        first.set_item(CURRENT_USER_KEY, r#"{"name":"Guest"}"#).unwrap();

        let second = FileSessionStorage::open(temp.path().join("session")).unwrap();
        assert_eq!(
            second.get_item(CURRENT_USER_KEY).unwrap().as_deref(),
            Some(r#"{"name":"Guest"}"#)
        );
    }

    #[test]
    fn file_storage_clear_drops_all_keys() {
        let temp = TempDir::new().unwrap();
        let storage = FileSessionStorage::open(temp.path()).unwrap();
        storage.set_item(CACHE_KEY, "{}").unwrap();
        storage.set_item(SUMMARY_TASKS_KEY, "[]").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.get_item(CACHE_KEY).unwrap(), None);
        assert_eq!(storage.get_item(SUMMARY_TASKS_KEY).unwrap(), None);
        // Removing a missing key is fine.
        storage.remove_item(CACHE_KEY).unwrap();
    }

    #[test]
    fn json_helpers_round_trip() {
        let storage = MemorySessionStorage::new();
        save_json(&storage, "numbers", &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<i32>> = load_json(&storage, "numbers").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        storage.set_item("broken", "{not json").unwrap();
        assert!(load_json::<Vec<i32>>(&storage, "broken").is_err());
    }
}
