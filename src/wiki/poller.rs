// =============================================================================
// Upstream Pollers
// =============================================================================
//
// One task per endpoint.  Each task awaits its own fetches sequentially, so
// results land in the cache in the order they were requested.  Failures are
// logged, recorded in the error ring and otherwise ignored: the cache keeps
// its last good generations and the next tick tries again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::app_state::AppState;

/// Fetch the catalog, retrying until it succeeds.
pub async fn load_catalog(state: Arc<AppState>) {
    loop {
        match state.wiki.fetch_mapping().await {
            Ok(items) => {
                info!(count = items.len(), "item catalog loaded");
                state.market.apply_catalog(items);
                state.increment_version();
                return;
            }
            Err(e) => {
                let retry = state.config.read().catalog_retry_secs;
                warn!(error = %e, retry_secs = retry, "catalog fetch failed — retrying");
                state.push_error("catalog", format!("{e:#}"));
                tokio::time::sleep(Duration::from_secs(retry)).await;
            }
        }
    }
}

/// Fetch `/latest` once and push it as a new generation.
pub async fn poll_latest(state: &AppState) -> Result<()> {
    let prices = state.wiki.fetch_latest().await?;
    let count = prices.len();
    state.market.apply_latest(prices);
    state.increment_version();
    info!(count, nature_price = state.market.nature_price(), "latest prices applied");
    Ok(())
}

/// Fetch `/1h` once and push it as a new generation.
pub async fn poll_hourly(state: &AppState) -> Result<()> {
    let hourly = state.wiki.fetch_hourly().await?;
    let count = hourly.len();
    state.market.apply_hourly(hourly);
    state.increment_version();
    info!(count, "hourly aggregates applied");
    Ok(())
}

/// Poll `/latest` every `latest_poll_secs` forever.
pub async fn run_latest_poller(state: Arc<AppState>) {
    let secs = state.config.read().latest_poll_secs;
    run_every(state, "latest", secs, |s| async move { poll_latest(&s).await }).await
}

/// Poll `/1h` every `hourly_poll_secs` forever.
pub async fn run_hourly_poller(state: Arc<AppState>) {
    let secs = state.config.read().hourly_poll_secs;
    run_every(state, "hourly", secs, |s| async move { poll_hourly(&s).await }).await
}

async fn run_every<F, Fut>(state: Arc<AppState>, source: &'static str, secs: u64, poll: F)
where
    F: Fn(Arc<AppState>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    info!(source, interval_secs = secs, "poller starting");

    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = poll(state.clone()).await {
            warn!(source, error = %e, "poll failed — keeping previous data");
            state.push_error(source, format!("{e:#}"));
        }
    }
}
