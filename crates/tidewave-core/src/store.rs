//! Keyed persistence for durable session fields.
//!
//! Every durable field is stored under its own key as a JSON document.
//! Reads never fail: a missing or unreadable value yields the caller's
//! default and the problem is only logged. Writes are write-through and
//! likewise only logged on failure.

use crate::error::{TidewaveError, TidewaveResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Logical keys of the persisted session state
pub mod keys {
    pub const SESSION_URL: &str = "session.url";
    pub const SESSION_HISTORY_STACK: &str = "session.historyStack";
    pub const SESSION_HISTORY_INDEX: &str = "session.historyIndex";
    pub const THEME: &str = "theme";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const VISITED_HISTORY: &str = "visitedHistory";
    pub const DOWNLOADS: &str = "downloads";
    pub const AD_BLOCK_STATS: &str = "adBlockStats";
}

/// Raw keyed storage backend
pub trait PersistentStore: Send {
    /// Load the serialized value stored under `key`, if any
    fn load_raw(&self, key: &str) -> Option<String>;

    /// Replace the serialized value stored under `key`
    fn save_raw(&mut self, key: &str, value: String) -> TidewaveResult<()>;
}

/// Typed access on top of any [`PersistentStore`]
pub trait StoreExt: PersistentStore {
    /// Read `key`, falling back to `default` when absent or undecodable
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.load_raw(key) else {
            tracing::debug!(key, "No persisted value, using default");
            return default;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "Discarding unreadable persisted value");
                default
            }
        }
    }

    /// Serialize and save `value` under `key`
    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "Failed to serialize value");
                return;
            }
        };

        if let Err(err) = self.save_raw(key, raw) {
            tracing::warn!(key, error = %err, "Failed to persist value");
        }
    }
}

impl<S: PersistentStore + ?Sized> StoreExt for S {}

impl PersistentStore for Box<dyn PersistentStore> {
    fn load_raw(&self, key: &str) -> Option<String> {
        (**self).load_raw(key)
    }

    fn save_raw(&mut self, key: &str, value: String) -> TidewaveResult<()> {
        (**self).save_raw(key, value)
    }
}

/// In-process store, used by tests and `--memory` sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct view of a stored document
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Plant a raw document, bypassing serialization
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save_raw(&mut self, key: &str, value: String) -> TidewaveResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the store directory
    pub fn open(dir: impl Into<PathBuf>) -> TidewaveResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            TidewaveError::store(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        tracing::info!("Opened session store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl PersistentStore for JsonFileStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", path.display(), err);
                None
            }
        }
    }

    fn save_raw(&mut self, key: &str, value: String) -> TidewaveResult<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AdBlockStats;

    #[test]
    fn test_missing_key_yields_default() {
        let store = MemoryStore::new();
        let index: usize = store.get(keys::SESSION_HISTORY_INDEX, 7);
        assert_eq!(index, 7);
    }

    #[test]
    fn test_corrupt_value_yields_default() {
        let mut store = MemoryStore::new();
        store.insert_raw(keys::SESSION_HISTORY_STACK, "not json [");

        let stack: Vec<String> = store.get(keys::SESSION_HISTORY_STACK, vec!["x".to_string()]);
        assert_eq!(stack, vec!["x".to_string()]);
    }

    #[test]
    fn test_adblock_stats_round_trip() {
        let mut store = MemoryStore::new();
        let stats = AdBlockStats {
            total_blocked: 5,
            ..AdBlockStats::default()
        };
        store.set(keys::AD_BLOCK_STATS, &stats);

        let raw = store.raw(keys::AD_BLOCK_STATS).unwrap().to_string();
        let mut reloaded = MemoryStore::new();
        reloaded.insert_raw(keys::AD_BLOCK_STATS, raw);

        let loaded: AdBlockStats = reloaded.get(keys::AD_BLOCK_STATS, AdBlockStats::default());
        assert_eq!(loaded.total_blocked, 5);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = JsonFileStore::open(dir.path()).unwrap();
            store.set(keys::SESSION_URL, "https://example.com");
        }

        let store = JsonFileStore::open(dir.path()).unwrap();
        let url: String = store.get(keys::SESSION_URL, String::new());
        assert_eq!(url, "https://example.com");
        assert!(dir.path().join("session.url.json").exists());
    }

    #[test]
    fn test_boxed_store_is_usable() {
        let mut store: Box<dyn PersistentStore> = Box::new(MemoryStore::new());
        store.set(keys::THEME, "light");
        let theme: String = store.get(keys::THEME, String::new());
        assert_eq!(theme, "light");
    }
}
