// =============================================================================
// RuneTerminal — Main Entry Point
// =============================================================================
//
// Loads configuration, opens the watchlist store, starts the upstream pollers
// and serves the REST API until Ctrl+C.
// =============================================================================

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rune_terminal::api;
use rune_terminal::app_state::AppState;
use rune_terminal::runtime_config::MarketConfig;
use rune_terminal::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use rune_terminal::watchlist::WatchlistService;
use rune_terminal::wiki::{poller, WikiClient};

const CONFIG_PATH: &str = "rune_terminal.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("RuneTerminal starting up");

    let mut config = MarketConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        MarketConfig::default()
    });
    config.apply_env_overrides();

    info!(
        api = %config.api_base_url,
        latest_poll_secs = config.latest_poll_secs,
        hourly_poll_secs = config.hourly_poll_secs,
        "Configuration loaded"
    );

    // ── 2. Watchlist store ───────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = if config.storage_path.is_empty() {
        warn!("No storage path configured; watchlist will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let file = JsonFileStore::open(&config.storage_path)?;
        info!(path = %file.path().display(), "Watchlist store opened");
        Arc::new(file)
    };

    // ── 3. Shared state ──────────────────────────────────────────────────
    let wiki = WikiClient::from_config(&config);
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, WatchlistService::new(store), wiki));

    // ── 4. Upstream pollers ──────────────────────────────────────────────
    tokio::spawn(poller::load_catalog(state.clone()));
    tokio::spawn(poller::run_latest_poller(state.clone()));
    tokio::spawn(poller::run_hourly_poller(state.clone()));

    // ── 5. Start the API server ──────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 6. Graceful shutdown ─────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = state.config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save config on shutdown");
    }

    info!("RuneTerminal shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, draining connections");
}
