use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::storage::KeyValueStore;
use crate::types::ItemId;

/// Storage key of the single shared watchlist.
pub const WATCHLIST_KEY: &str = "user_watchlist";

/// Persisted, ordered set of watched item ids.
///
/// The list lives under one key of a [`KeyValueStore`].  Every toggle is a
/// single atomic `update` on the store, so concurrent toggles are applied one
/// after another rather than racing.
#[derive(Clone)]
pub struct WatchlistService {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

fn decode(value: Option<Value>) -> Result<Vec<ItemId>> {
    match value {
        Some(v) => serde_json::from_value(v).context("stored watchlist is not a list of ids"),
        None => Ok(Vec::new()),
    }
}

impl WatchlistService {
    /// A watchlist stored under the shared [`WATCHLIST_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, WATCHLIST_KEY)
    }

    /// A watchlist stored under an explicit key, e.g. one per session.
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Current list; empty if nothing was ever written.
    pub fn get(&self) -> Result<Vec<ItemId>> {
        decode(self.store.get(&self.key)?)
    }

    /// Remove `id` if present, otherwise append it; return the new list.
    pub fn toggle(&self, id: ItemId) -> Result<Vec<ItemId>> {
        let mut added = false;
        let stored = self.store.update(&self.key, &mut |current| {
            let mut list = decode(current)?;
            if let Some(pos) = list.iter().position(|&x| x == id) {
                list.remove(pos);
                added = false;
            } else {
                list.push(id);
                added = true;
            }
            Ok(serde_json::to_value(&list)?)
        })?;

        let list = decode(Some(stored))?;
        info!(item_id = id, added, size = list.len(), "watchlist toggled");
        Ok(list)
    }
}
