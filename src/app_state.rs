// =============================================================================
// Central Application State — RuneTerminal market service
// =============================================================================
//
// Ties the subsystems together for the pollers and the HTTP API:
//
//   - `MarketCache`       — poller-owned latest/previous generations
//   - `WatchlistService`  — the persisted watchlist
//   - `WikiClient`        — upstream client, shared with on-demand handlers
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the configuration and the error log.
//   - Subsystems manage their own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::derivatives::{sentiment_breakdown, SentimentBreakdown};
use crate::market_data::{CacheStatus, MarketCache};
use crate::runtime_config::MarketConfig;
use crate::watchlist::WatchlistService;
use crate::wiki::WikiClient;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the overview error log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Which subsystem failed (e.g. `latest`, `hourly`, `catalog`).
    pub source: String,
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter.  Incremented on every applied
    /// poll and every watchlist change.
    pub state_version: AtomicU64,

    pub config: Arc<RwLock<MarketConfig>>,

    pub market: Arc<MarketCache>,

    pub watchlist: WatchlistService,

    pub wiki: WikiClient,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the state from its already-built subsystems.
    ///
    /// The returned value is typically wrapped in `Arc` immediately.
    pub fn new(config: MarketConfig, watchlist: WatchlistService, wiki: WikiClient) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            config: Arc::new(RwLock::new(config)),
            market: Arc::new(MarketCache::new()),
            watchlist,
            wiki,
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message.  The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, source: &str, message: String) {
        let record = ErrorRecord {
            source: source.to_string(),
            message,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build the payload of `GET /api/overview`.
    pub fn build_overview(&self) -> MarketOverview {
        let (latest_hourly, previous_hourly) = self.market.hourly_pair();

        MarketOverview {
            state_version: self.current_state_version(),
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            cache: self.market.status(),
            nature_price: self.market.nature_price(),
            sentiment: sentiment_breakdown(&latest_hourly, &previous_hourly),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}

/// Service-wide status and headline figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub state_version: u64,
    pub server_time: i64,
    pub uptime_secs: u64,
    pub cache: CacheStatus,
    pub nature_price: i64,
    pub sentiment: SentimentBreakdown,
    pub recent_errors: Vec<ErrorRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(
            MarketConfig::default(),
            WatchlistService::new(Arc::new(MemoryStore::new())),
            WikiClient::new("http://127.0.0.1:9", "test", Duration::from_secs(1)),
        )
    }

    #[test]
    fn error_log_is_capped() {
        let s = state();
        for i in 0..(MAX_RECENT_ERRORS + 5) {
            s.push_error("latest", format!("e{i}"));
        }
        let errors = s.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors[0].message, "e5");
    }

    #[test]
    fn overview_before_first_poll_is_neutral() {
        let s = state();
        let o = s.build_overview();
        assert_eq!(o.cache.catalog_size, 0);
        assert_eq!(o.nature_price, 0);
        assert_eq!(o.sentiment.sentiment, 50.0);
    }

    #[test]
    fn version_increments() {
        let s = state();
        let before = s.current_state_version();
        s.increment_version();
        assert_eq!(s.current_state_version(), before + 1);
    }
}
