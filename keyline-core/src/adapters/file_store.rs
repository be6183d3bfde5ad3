//! File-backed session store
//!
//! Persists the three session keys as a flat string map in `session.json`,
//! the local-storage analog for a terminal app. Reads tolerate a corrupt
//! file (treated as empty); writes take an advisory file lock so concurrent
//! invocations don't interleave.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStore;

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(keyline_dir: &Path) -> Self {
        Self {
            path: keyline_dir.join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            // Corrupt content falls back to an empty map
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        }
    }

    fn with_locked_map<T>(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| Error::storage(format!("Cannot open session file: {}", e)))?;

        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Cannot lock session file: {}", e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::storage(format!("Cannot read session file: {}", e)))?;
        let mut map: BTreeMap<String, String> =
            serde_json::from_str(&content).unwrap_or_default();

        let result = mutate(&mut map);

        let serialized = serde_json::to_string_pretty(&map)?;
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.set_len(0))
            .and_then(|_| file.write_all(serialized.as_bytes()))
            .map_err(|e| Error::storage(format!("Cannot write session file: {}", e)))?;

        let _ = file.unlock();
        Ok(result)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_locked_map(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_locked_map(|map| {
            map.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        assert_eq!(store.get("walletAddress").unwrap(), None);

        store.set("walletAddress", "0xabc").unwrap();
        assert_eq!(
            store.get("walletAddress").unwrap(),
            Some("0xabc".to_string())
        );

        store.remove("walletAddress").unwrap();
        assert_eq!(store.get("walletAddress").unwrap(), None);
    }

    #[test]
    fn test_removing_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileSessionStore::new(dir.path());
            store.set("walletAuthenticated", "true").unwrap();
        }
        let store = FileSessionStore::new(dir.path());
        assert_eq!(
            store.get("walletAuthenticated").unwrap(),
            Some("true".to_string())
        );
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("session.json"), "{broken").unwrap();

        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.get("walletAddress").unwrap(), None);

        // Writing through the corrupt file replaces it
        store.set("walletAddress", "0xabc").unwrap();
        assert_eq!(
            store.get("walletAddress").unwrap(),
            Some("0xabc".to_string())
        );
    }
}
