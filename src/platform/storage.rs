//! Key-value string stores
//!
//! Checkpoints and settings are written through [`KeyValueStore`]. The web
//! build uses LocalStorage; native builds keep a JSON file or memory.

use std::collections::BTreeMap;

use crate::GameError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError>;
    fn remove(&mut self, key: &str) -> Result<(), GameError>;
}

/// Volatile store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), GameError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Whole store kept as one JSON object on disk, rewritten on every change
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    path: std::path::PathBuf,
    entries: BTreeMap<String, String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt store {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    fn flush(&self, key: &str) -> Result<(), GameError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json).map_err(|e| GameError::storage(key, e))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush(key)
    }

    fn remove(&mut self, key: &str) -> Result<(), GameError> {
        if self.entries.remove(key).is_some() {
            self.flush(key)?;
        }
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| GameError::storage(key, format!("{:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), GameError> {
        self.storage
            .remove_item(key)
            .map_err(|e| GameError::storage(key, format!("{:?}", e)))
    }
}

/// Read an integer, falling back to `default` when absent or malformed
pub fn get_number(store: &dyn KeyValueStore, key: &str, default: i64) -> i64 {
    match store.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Stored '{}' is not a number: {:?}", key, raw);
            default
        }),
    }
}

pub fn set_number(store: &mut dyn KeyValueStore, key: &str, value: i64) -> Result<(), GameError> {
    store.set(key, &value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").expect("memory store never fails");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").expect("memory store never fails");
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_numbers_default() {
        let mut store = MemoryStore::new();
        assert_eq!(get_number(&store, "score", 7), 7);
        store.set("score", "garbage").expect("set");
        assert_eq!(get_number(&store, "score", 7), 7);
        set_number(&mut store, "score", 1250).expect("set");
        assert_eq!(get_number(&store, "score", 7), 1250);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_persists() {
        let path = std::env::temp_dir().join(format!("xenophobia-store-{}.json", std::process::id()));
        {
            let mut store = FileStore::open(&path);
            store.set("world", "2").expect("write store");
        }
        let store = FileStore::open(&path);
        assert_eq!(store.get("world").as_deref(), Some("2"));
        let _ = std::fs::remove_file(&path);
    }
}
