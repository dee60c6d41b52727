use crate::types::ItemId;

/// Client-side cached copy of the server watchlist.
///
/// Toggles are applied optimistically and then either confirmed with the
/// server's list or rolled back, so the cache never diverges from a confirmed
/// server state for longer than one failed round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistMirror {
    items: Vec<ItemId>,
}

/// Undo record for one optimistic toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending toggle must be confirmed or rolled back"]
pub struct PendingToggle {
    pub item_id: ItemId,
    before: Vec<ItemId>,
}

impl WatchlistMirror {
    pub fn new(items: Vec<ItemId>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Flip `id` locally and return the record needed to undo it.
    pub fn begin_toggle(&mut self, id: ItemId) -> PendingToggle {
        let before = self.items.clone();
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.items.remove(pos);
        } else {
            self.items.push(id);
        }
        PendingToggle {
            item_id: id,
            before,
        }
    }

    /// Adopt the authoritative list returned by the server.
    pub fn confirm(&mut self, _pending: PendingToggle, server_list: Vec<ItemId>) {
        self.items = server_list;
    }

    /// Restore the pre-toggle state after a failed persistence call.
    pub fn rollback(&mut self, pending: PendingToggle) {
        self.items = pending.before;
    }
}
