// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Every tunable of the market service lives here: upstream endpoint, polling
// cadence, storage location, dump-detection thresholds and the default
// screener filters.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::derivatives::DumpThresholds;
use crate::flipping::FlipFilters;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_api_base_url() -> String {
    "https://prices.runescape.wiki/api/v1/osrs".to_string()
}

fn default_user_agent() -> String {
    "RuneTerminal - Market Analytics Tool".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_latest_poll_secs() -> u64 {
    30
}

fn default_hourly_poll_secs() -> u64 {
    300
}

fn default_catalog_retry_secs() -> u64 {
    30
}

fn default_storage_path() -> String {
    "watchlist_store.json".to_string()
}

// =============================================================================
// MarketConfig
// =============================================================================

/// Top-level configuration for the market service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    // --- HTTP server ---------------------------------------------------------

    /// Address the local API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Upstream price API --------------------------------------------------

    /// Base URL of the upstream price API (no trailing slash).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// `User-Agent` sent with every upstream request.  The upstream asks
    /// clients to identify themselves.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for upstream calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Polling cadence -----------------------------------------------------

    /// Interval between `/latest` polls.
    #[serde(default = "default_latest_poll_secs")]
    pub latest_poll_secs: u64,

    /// Interval between `/1h` polls.
    #[serde(default = "default_hourly_poll_secs")]
    pub hourly_poll_secs: u64,

    /// Delay before retrying a failed catalog fetch.
    #[serde(default = "default_catalog_retry_secs")]
    pub catalog_retry_secs: u64,

    // --- Persistence ---------------------------------------------------------

    /// JSON file backing the key-value store.  Empty keeps it in memory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    // --- Analytics -----------------------------------------------------------

    /// Dump detection cut-offs.
    #[serde(default)]
    pub dump: DumpThresholds,

    /// Screener filters applied when a request does not override them.
    #[serde(default)]
    pub flip_defaults: FlipFilters,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            latest_poll_secs: default_latest_poll_secs(),
            hourly_poll_secs: default_hourly_poll_secs(),
            catalog_retry_secs: default_catalog_retry_secs(),
            storage_path: default_storage_path(),
            dump: DumpThresholds::default(),
            flip_defaults: FlipFilters::default(),
        }
    }
}

impl MarketConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            api_base_url = %config.api_base_url,
            latest_poll_secs = config.latest_poll_secs,
            hourly_poll_secs = config.hourly_poll_secs,
            "config loaded"
        );

        Ok(config)
    }

    /// Apply `RUNETERM_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = non_empty("RUNETERM_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = non_empty("RUNETERM_API_BASE") {
            self.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty("RUNETERM_USER_AGENT") {
            self.user_agent = v;
        }
        // An explicitly empty storage path selects the in-memory store.
        if let Some(v) = lookup("RUNETERM_STORAGE_PATH") {
            self.storage_path = v.trim().to_string();
        }
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }
}
