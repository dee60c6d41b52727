// =============================================================================
// Key-Value Storage
// =============================================================================
//
// A tiny JSON key-value abstraction backing the watchlist.  Implementations
// serialise all writes behind their own lock, so `update` is an atomic
// read-modify-write for every key: two concurrent toggles can never lose one
// another's change.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use serde_json::Value;

/// Closure applied by [`KeyValueStore::update`] to the stored value.
pub type UpdateFn<'a> = &'a mut dyn FnMut(Option<Value>) -> Result<Value>;

/// A process-wide JSON key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrite `key` with `value`.
    fn put(&self, key: &str, value: Value) -> Result<()>;

    /// Atomically replace `key` with `f(current)` and return the new value.
    ///
    /// If `f` or the write fails, the stored value is left untouched.
    fn update(&self, key: &str, f: UpdateFn<'_>) -> Result<Value>;
}
