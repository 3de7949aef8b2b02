//! Key-value persistence for session snapshots.
//!
//! Values are opaque strings. They are only meaningful to the same build that
//! wrote them; use [`crate::persist`] for files meant to be shared.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Logical save slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Name, race and equipment, written by an explicit save.
    Profile,
    /// The full session, written by auto-save and `:w`.
    Session,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Profile => "character",
            StoreKey::Session => "characterState",
        }
    }
}

/// A persistent string map.
pub trait KeyValueStore: Send {
    fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;
    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.as_str(), value.to_string());
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self
            .values
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get(key.as_str())
            .cloned())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.values
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .remove(key.as_str());
        Ok(())
    }
}

/// File-backed store: one JSON object of key to value.
///
/// The whole map is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or lazily create) `storage.json` inside `dir`.
    ///
    /// An unreadable or corrupt file is logged and treated as empty so the
    /// app still starts.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(Self::FILE_NAME);

        let cache = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!("Failed to parse storage file {}: {}", path.display(), e);
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read storage file {}: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!("Storage initialized at: {}", path.display());

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the map is written to before it replaces `storage.json`.
    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Write the whole map, replacing the old file only once the new one is complete.
    fn persist(&self, cache: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(cache)?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.write().map_err(|_| StoreError::Poisoned)?;
        cache.insert(key.as_str().to_string(), value.to_string());
        self.persist(&cache)
    }

    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let cache = self.cache.read().map_err(|_| StoreError::Poisoned)?;
        Ok(cache.get(key.as_str()).cloned())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        let mut cache = self.cache.write().map_err(|_| StoreError::Poisoned)?;
        if cache.remove(key.as_str()).is_some() {
            self.persist(&cache)?;
        }
        Ok(())
    }
}

/// Platform config directory for this app, if one can be determined.
///
/// - Linux: `~/.config/encumbrance`
/// - macOS: `~/Library/Application Support/io.encumbrance.encumbrance`
/// - Windows: `%APPDATA%\encumbrance\encumbrance\config`
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("io", "encumbrance", "encumbrance").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_save_load_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.load(StoreKey::Session).unwrap(), None);

        store.save(StoreKey::Session, "{}").unwrap();
        assert_eq!(store.load(StoreKey::Session).unwrap().as_deref(), Some("{}"));
        assert_eq!(store.load(StoreKey::Profile).unwrap(), None);

        store.remove(StoreKey::Session).unwrap();
        assert_eq!(store.load(StoreKey::Session).unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let store = FileStore::open(temp_dir.path());
        store.save(StoreKey::Profile, "profile-data").unwrap();
        store.save(StoreKey::Session, "session-data").unwrap();
        assert!(store.path().exists());

        let reopened = FileStore::open(temp_dir.path());
        assert_eq!(
            reopened.load(StoreKey::Profile).unwrap().as_deref(),
            Some("profile-data")
        );

        reopened.remove(StoreKey::Session).unwrap();
        let again = FileStore::open(temp_dir.path());
        assert_eq!(again.load(StoreKey::Session).unwrap(), None);
        assert_eq!(
            again.load(StoreKey::Profile).unwrap().as_deref(),
            Some("profile-data")
        );
    }

    #[test]
    fn test_file_store_replaces_file_whole() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path());
        store.save(StoreKey::Profile, "first").unwrap();

        // Leftovers from an interrupted write never shadow the real file
        std::fs::write(store.temp_path(), "{\"character\": \"torn").unwrap();
        store.save(StoreKey::Session, "second").unwrap();

        assert!(!store.temp_path().exists());
        let data = std::fs::read_to_string(store.path()).unwrap();
        let map: HashMap<String, String> = serde_json::from_str(&data).unwrap();
        assert_eq!(map.get("character").map(String::as_str), Some("first"));
        assert_eq!(map.get("characterState").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join(FileStore::FILE_NAME), "not json")
            .expect("write should succeed");

        let store = FileStore::open(temp_dir.path());
        assert_eq!(store.load(StoreKey::Session).unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nested = temp_dir.path().join("a").join("b");

        let store = FileStore::open(&nested);
        store.save(StoreKey::Session, "x").unwrap();
        assert!(nested.join(FileStore::FILE_NAME).exists());
    }

    #[test]
    fn test_store_keys_match_storage_names() {
        assert_eq!(StoreKey::Profile.as_str(), "character");
        assert_eq!(StoreKey::Session.as_str(), "characterState");
    }
}
