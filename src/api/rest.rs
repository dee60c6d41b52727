// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/`.  Every response uses the
// `{ success, data }` / `{ success: false, error }` envelope.  There is no
// authentication: the service exposes a single shared watchlist.
//
// CORS is configured permissively so a browser dashboard on another origin
// can poll the API.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::api::error::{ok, ApiError, ApiResponse};
use crate::app_state::{AppState, MarketOverview};
use crate::derivatives::{
    calculate_alch_profit, calculate_index_performance, find_dumps, is_dump_item, percent_change,
    sentiment_breakdown, top_movers, AlchResult, MarginResult, Movers, SentimentBreakdown,
};
use crate::flipping::{build_flip_table, FlipRow};
use crate::market_data::{is_sink_item, Basket};
use crate::price_database::{search_catalog, CatalogRow};
use crate::types::{
    AssetDescriptor, HourlyAggregate, ItemId, PriceSnapshot, TimeSeriesPoint, Timestep,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Default number of rows returned by list endpoints.
const DEFAULT_LIMIT: usize = 100;

/// Default number of entries on each side of the movers board.
const DEFAULT_MOVERS: usize = 10;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Service ─────────────────────────────────────────────────
        .route("/api/health", get(health))
        .route("/api/overview", get(overview))
        // ── Watchlist ───────────────────────────────────────────────
        .route("/api/watchlist", get(get_watchlist))
        .route("/api/watchlist/toggle", post(toggle_watchlist))
        // ── Derived market views ────────────────────────────────────
        .route("/api/items", get(search_items))
        .route("/api/items/:id", get(item_report))
        .route("/api/flips", get(flips))
        .route("/api/indices", get(indices))
        .route("/api/sentiment", get(sentiment))
        .route("/api/movers", get(movers))
        .route("/api/dumps", get(dumps))
        .route("/api/timeseries/:id", get(timeseries))
        // ── Middleware & State ───────────────────────────────────────
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

// =============================================================================
// Health & overview
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn overview(State(state): State<Arc<AppState>>) -> Json<ApiResponse<MarketOverview>> {
    ok(state.build_overview())
}

// =============================================================================
// Watchlist
// =============================================================================

async fn get_watchlist(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ItemId>> {
    Ok(ok(read_watchlist(&state).await?))
}

/// Read the watchlist off the async workers; the file store's lock may be
/// held across a disk write.
async fn read_watchlist(state: &AppState) -> Result<Vec<ItemId>, ApiError> {
    let watchlist = state.watchlist.clone();
    let list = tokio::task::spawn_blocking(move || watchlist.get())
        .await
        .map_err(|e| ApiError::internal(format!("watchlist task failed: {e}")))??;
    Ok(list)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleRequest {
    item_id: ItemId,
}

async fn toggle_watchlist(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<Vec<ItemId>> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    // The file-backed store does blocking I/O.
    let watchlist = state.watchlist.clone();
    let list = tokio::task::spawn_blocking(move || watchlist.toggle(req.item_id))
        .await
        .map_err(|e| ApiError::internal(format!("watchlist task failed: {e}")))??;

    state.increment_version();
    Ok(ok(list))
}

// =============================================================================
// Price database
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

async fn search_items(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Vec<CatalogRow>> {
    let watchlist = read_watchlist(&state).await?;
    let catalog = state.market.catalog();
    let latest = state.market.latest();

    Ok(ok(search_catalog(
        &catalog,
        &latest,
        &watchlist,
        q.q.as_deref().unwrap_or(""),
        q.limit.unwrap_or(DEFAULT_LIMIT),
    )))
}

// =============================================================================
// Item report
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemReport {
    item: AssetDescriptor,
    price: Option<PriceSnapshot>,
    margin: MarginResult,
    alch: Option<AlchResult>,
    hourly: Option<HourlyAggregate>,
    change_pct: Option<f64>,
    is_dump: bool,
    is_sink: bool,
    watchlisted: bool,
}

async fn item_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> ApiResult<ItemReport> {
    let catalog = state.market.catalog();
    let item = catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("item {id} not found")))?;

    let latest = state.market.latest();
    let (hourly, previous) = state.market.hourly_pair();
    let thresholds = state.config.read().dump;

    let price = latest.get(&id).copied();
    let margin = price.map(|p| p.margin()).unwrap_or_default();

    // Alching buys at the instant-buy price.
    let alch = item.highalch.map(|high_alch| {
        let buy = price.and_then(|p| p.high).unwrap_or(0);
        calculate_alch_profit(high_alch, buy, state.market.nature_price())
    });

    let current = hourly.get(&id).copied();
    let prior = previous.get(&id);
    let change_pct = current
        .and_then(|c| c.avg_high_price)
        .zip(prior.and_then(|p| p.avg_high_price))
        .and_then(|(c, p)| percent_change(c, p));
    let is_dump = current
        .map(|c| is_dump_item(&c, prior, &thresholds))
        .unwrap_or(false);

    let watchlisted = read_watchlist(&state).await?.contains(&id);

    Ok(ok(ItemReport {
        item,
        price,
        margin,
        alch,
        hourly: current,
        change_pct,
        is_dump,
        is_sink: is_sink_item(id),
        watchlisted,
    }))
}

// =============================================================================
// Flipping screener
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct FlipQuery {
    min_profit: Option<i64>,
    min_roi: Option<f64>,
    min_volume: Option<u64>,
    members_only: Option<bool>,
    hide_sinks: Option<bool>,
    limit: Option<usize>,
}

async fn flips(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FlipQuery>,
) -> Json<ApiResponse<Vec<FlipRow>>> {
    let mut filters = state.config.read().flip_defaults.clone();
    if let Some(v) = q.min_profit {
        filters.min_profit = v;
    }
    if let Some(v) = q.min_roi {
        filters.min_roi = v;
    }
    if let Some(v) = q.min_volume {
        filters.min_volume = v;
    }
    if let Some(v) = q.members_only {
        filters.members_only = v;
    }
    if let Some(v) = q.hide_sinks {
        filters.hide_sink_items = v;
    }

    let catalog = state.market.catalog();
    let latest = state.market.latest();
    let (hourly, _) = state.market.hourly_pair();

    let mut rows = build_flip_table(&catalog, &latest, &hourly, &filters);
    rows.truncate(q.limit.unwrap_or(DEFAULT_LIMIT));
    ok(rows)
}

// =============================================================================
// Indices, sentiment, movers, dumps
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    basket: String,
    performance: f64,
    members: &'static [ItemId],
}

async fn indices(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<IndexEntry>>> {
    let (latest, previous) = state.market.hourly_pair();
    let entries = Basket::ALL
        .iter()
        .map(|basket| IndexEntry {
            basket: basket.to_string(),
            performance: calculate_index_performance(basket.members(), &latest, &previous),
            members: basket.members(),
        })
        .collect();
    ok(entries)
}

async fn sentiment(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SentimentBreakdown>> {
    let (latest, previous) = state.market.hourly_pair();
    ok(sentiment_breakdown(&latest, &previous))
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn movers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LimitQuery>,
) -> Json<ApiResponse<Movers>> {
    let (latest, previous) = state.market.hourly_pair();
    ok(top_movers(&latest, &previous, q.limit.unwrap_or(DEFAULT_MOVERS)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpEntry {
    id: ItemId,
    name: Option<String>,
    hourly: HourlyAggregate,
}

async fn dumps(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<DumpEntry>>> {
    let (latest, previous) = state.market.hourly_pair();
    let catalog = state.market.catalog();
    let thresholds = state.config.read().dump;

    let entries = find_dumps(&latest, &previous, &thresholds)
        .into_iter()
        .filter_map(|id| {
            Some(DumpEntry {
                id,
                name: catalog.get(&id).map(|d| d.name.clone()),
                hourly: *latest.get(&id)?,
            })
        })
        .collect();
    ok(entries)
}

// =============================================================================
// Time series (proxied on demand)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct TimeSeriesQuery {
    timestep: Option<Timestep>,
}

async fn timeseries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
    Query(q): Query<TimeSeriesQuery>,
) -> Json<ApiResponse<Vec<TimeSeriesPoint>>> {
    let timestep = q.timestep.unwrap_or_default();
    let points = match state.wiki.fetch_timeseries(id, timestep).await {
        Ok(points) => points,
        Err(e) => {
            warn!(id, %timestep, error = %e, "time series unavailable, returning empty series");
            state.push_error("timeseries", format!("{e:#}"));
            Vec::new()
        }
    };
    ok(points)
}

// =============================================================================
// Tests
// =============================================================================
