//! Persistent key-value storage for reading state.
//!
//! Keys used by the client:
//!
//! | Key | Value |
//! |-----|-------|
//! | `progress:#<category>/<slug>` | scroll fraction, `0.0..=1.0` |
//! | `categoryState` | JSON object, category name → expanded |
//! | `theme` | `light` or `dark` |
//! | `language` | language code |
//!
//! Values are plain strings. Every write is a read-modify-write of the whole
//! store with no locking; there is one reader session.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                debug!(path = %path.display(), error = %e, "ignoring unreadable state file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_roundtrip() {
        let mut s = MemoryStore::new();
        s.set("theme", "dark".into()).unwrap();
        assert_eq!(s.get("theme").as_deref(), Some("dark"));
        s.set("theme", "light".into()).unwrap();
        assert_eq!(s.get("theme").as_deref(), Some("light"));
        assert_eq!(s.get("language"), None);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/reader.json");
        {
            let mut s = FileStore::open(&path);
            s.set("progress:#FAQ/install", "0.5".into()).unwrap();
        }
        let s = FileStore::open(&path);
        assert_eq!(s.get("progress:#FAQ/install").as_deref(), Some("0.5"));
    }

    #[test]
    fn file_store_corrupt_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("reader.json");
        std::fs::write(&path, "{{{").unwrap();
        assert_eq!(FileStore::open(&path).get("theme"), None);
    }

    #[test]
    fn file_store_open_does_not_create_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("reader.json");
        let s = FileStore::open(&path);
        assert_eq!(s.get("theme"), None);
        assert!(!path.exists());
    }
}
