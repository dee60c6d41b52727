use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::derivatives::nature_price;
use crate::market_data::Generations;
use crate::types::{AssetDescriptor, Catalog, HourlyPrices, LatestPrices};

// ---------------------------------------------------------------------------
// MarketCache -- the poller-owned view of the upstream market
// ---------------------------------------------------------------------------

/// Thread-safe cache of everything fetched from the upstream price API.
///
/// Only the pollers call the `apply_*` methods.  Readers obtain immutable
/// `Arc` snapshots and drop the lock before computing anything, so a slow
/// request never blocks a poll from landing.
pub struct MarketCache {
    catalog: RwLock<Arc<Catalog>>,
    latest: RwLock<Generations<LatestPrices>>,
    hourly: RwLock<Generations<HourlyPrices>>,
    /// Nature rune price derived from the most recent latest-price poll.
    nature_price: AtomicI64,
}

/// Poll counters and freshness for the overview endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub catalog_size: usize,
    pub latest_count: usize,
    pub latest_polls: u64,
    pub latest_updated_at: Option<DateTime<Utc>>,
    pub hourly_count: usize,
    /// Items that traded at least once in the latest hourly window.
    pub active_trades: usize,
    pub hourly_polls: u64,
    pub hourly_updated_at: Option<DateTime<Utc>>,
    pub has_hourly_baseline: bool,
}

impl Default for MarketCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketCache {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Arc::new(Catalog::new())),
            latest: RwLock::new(Generations::new()),
            hourly: RwLock::new(Generations::new()),
            nature_price: AtomicI64::new(0),
        }
    }

    // ── Writers (pollers only) ──────────────────────────────────────────

    /// Replace the catalog wholesale.
    pub fn apply_catalog(&self, items: Vec<AssetDescriptor>) {
        let catalog: Catalog = items.into_iter().map(|d| (d.id, d)).collect();
        debug!(count = catalog.len(), "catalog applied");
        *self.catalog.write() = Arc::new(catalog);
    }

    /// Push a new latest-price generation and re-derive the nature price.
    pub fn apply_latest(&self, prices: LatestPrices) {
        let nature = nature_price(&prices);
        self.latest.write().push(prices);
        self.nature_price.store(nature, Ordering::SeqCst);
    }

    /// Push a new hourly generation.
    pub fn apply_hourly(&self, hourly: HourlyPrices) {
        self.hourly.write().push(hourly);
    }

    // ── Readers ─────────────────────────────────────────────────────────

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    /// Current latest-price generation (empty before the first poll).
    pub fn latest(&self) -> Arc<LatestPrices> {
        self.latest.read().current().unwrap_or_default()
    }

    /// `(latest, previous)` hourly generations, empty where not yet polled.
    pub fn hourly_pair(&self) -> (Arc<HourlyPrices>, Arc<HourlyPrices>) {
        self.hourly.read().pair()
    }

    pub fn nature_price(&self) -> i64 {
        self.nature_price.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> CacheStatus {
        let catalog_size = self.catalog.read().len();
        let latest = self.latest.read();
        let hourly = self.hourly.read();
        CacheStatus {
            catalog_size,
            latest_count: latest.current().map(|m| m.len()).unwrap_or(0),
            latest_polls: latest.polls(),
            latest_updated_at: latest.updated_at(),
            hourly_count: hourly.current().map(|m| m.len()).unwrap_or(0),
            active_trades: hourly
                .current()
                .map(|m| m.values().filter(|a| a.total_volume() > 0).count())
                .unwrap_or(0),
            hourly_polls: hourly.polls(),
            hourly_updated_at: hourly.updated_at(),
            has_hourly_baseline: hourly.previous().is_some(),
        }
    }
}
