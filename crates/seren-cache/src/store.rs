//! Durable string key/value storage boundary.
//!
//! The preservation layer is decoupled from its backing store through the
//! [`KeyValueStore`] trait, so tests run against [`MemoryStore`] while
//! production uses [`FileStore`] (a single JSON map on disk).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// Durable string key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Shared handle to a key/value store.
pub type SharedStore = Arc<dyn KeyValueStore>;

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.map.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.map.read().keys().cloned().collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStore
// ─────────────────────────────────────────────────────────────────────────────

/// File-backed store: one JSON object per file, loaded lazily and cached,
/// written through on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl FileStore {
    /// Create a store backed by the given file. The file is created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if let Some(map) = self.cache.read().as_ref() {
            return Ok(map.clone());
        }

        let map = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        *self.cache.write() = Some(map.clone());
        Ok(map)
    }

    fn persist(&self, map: HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, json)?;
        *self.cache.write() = Some(map);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.persist(map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.persist(map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        // A fresh handle must see the persisted data.
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap(), Some("1".to_string()));

        let mut keys = reopened.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_file_store_remove_absent_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        store.remove("missing").unwrap();
    }
}
