use std::collections::HashMap;

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::Value;

use super::{KeyValueStore, UpdateFn};

/// Volatile store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn update(&self, key: &str, f: UpdateFn<'_>) -> Result<Value> {
        let mut entries = self.entries.lock();
        let next = f(entries.get(key).cloned())?;
        entries.insert(key.to_string(), next.clone());
        Ok(next)
    }
}
