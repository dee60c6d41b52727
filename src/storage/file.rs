// =============================================================================
// JSON File Store — whole-map persistence with atomic save
// =============================================================================
//
// The full key-value map lives in memory and is rewritten to a single JSON
// file on every mutation using the tmp + rename pattern, so a crash mid-write
// can never leave a truncated file behind.  A failed write rolls the in-memory
// map back to its previous contents before returning the error.
// =============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use super::{KeyValueStore, UpdateFn};

/// Durable store backed by one JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Value>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is treated as an empty store; an unreadable or corrupt
    /// one is an error so that existing data is never silently discarded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read store from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse store from {}", path.display()))?
        } else {
            HashMap::new()
        };

        info!(path = %path.display(), keys = entries.len(), "key-value store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk atomically (write `.tmp`, then rename).
    fn persist(&self, entries: &HashMap<String, Value>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(entries).context("failed to serialise store to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp store to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename tmp store to {}", self.path.display()))?;

        debug!(path = %self.path.display(), "store persisted");
        Ok(())
    }

    /// Insert `value` under `key` and persist, restoring the old value on
    /// failure.  The caller must hold the entries lock.
    fn commit(&self, entries: &mut HashMap<String, Value>, key: &str, value: Value) -> Result<()> {
        let old = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(entries) {
            match old {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.lock();
        self.commit(&mut entries, key, value)
    }

    fn update(&self, key: &str, f: UpdateFn<'_>) -> Result<Value> {
        let mut entries = self.entries.lock();
        let next = f(entries.get(key).cloned())?;
        self.commit(&mut entries, key, next.clone())?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put("user_watchlist", json!([4151, 2])).unwrap();
            store
                .update("counter", &mut |v| {
                    Ok(json!(v.and_then(|v| v.as_u64()).unwrap_or(0) + 1))
                })
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("user_watchlist").unwrap(), Some(json!([4151, 2])));
        assert_eq!(reopened.get("counter").unwrap(), Some(json!(1)));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
    }

    #[test]
    fn failed_persist_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        // The parent directory does not exist, so every write fails.
        let path = dir.path().join("missing").join("store.json");
        let store = JsonFileStore::open(&path).unwrap();

        assert!(store.put("k", json!(1)).is_err());
        assert!(store.get("k").unwrap().is_none());

        let res = store.update("k", &mut |_| Ok(json!(2)));
        assert!(res.is_err());
        assert!(store.get("k").unwrap().is_none());
    }
}
