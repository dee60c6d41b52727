// =============================================================================
// Watchlist
// =============================================================================
//
// The server-side service owns the authoritative list; the mirror is the
// client-side cache that applies toggles optimistically and rolls them back
// when persistence fails.

pub mod mirror;
pub mod service;

pub use mirror::{PendingToggle, WatchlistMirror};
pub use service::{WatchlistService, WATCHLIST_KEY};
