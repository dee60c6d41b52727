// =============================================================================
// Price API Client — anonymous GETs against the OSRS wiki real-time prices
// =============================================================================
//
// All endpoints are public.  The upstream asks every consumer to send a
// descriptive User-Agent, which is set once as a default header.  Responses
// are wrapped in a `{ "data": ... }` envelope, except `/mapping`, which is a
// bare list.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::runtime_config::MarketConfig;
use crate::types::{
    AssetDescriptor, HourlyPrices, ItemId, LatestPrices, TimeSeriesPoint, Timestep,
};

/// `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Typed client for the upstream price API.
#[derive(Clone)]
pub struct WikiClient {
    base_url: String,
    client: reqwest::Client,
}

impl WikiClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client for `base_url` identifying itself as `user_agent`.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut default_headers = HeaderMap::new();
        if let Ok(val) = HeaderValue::from_str(user_agent) {
            default_headers.insert(USER_AGENT, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        debug!(base_url = %base_url, "WikiClient initialised");

        Self { base_url, client }
    }

    /// Build a client from the service configuration.
    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(
            config.api_base_url.clone(),
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// GET /mapping — static item catalog (bare list).
    #[instrument(skip(self), name = "wiki::fetch_mapping")]
    pub async fn fetch_mapping(&self) -> Result<Vec<AssetDescriptor>> {
        let items: Vec<AssetDescriptor> = self.get_json("/mapping").await?;
        debug!(count = items.len(), "catalog fetched");
        Ok(items)
    }

    /// GET /latest — most recent instant-buy/sell price per item.
    #[instrument(skip(self), name = "wiki::fetch_latest")]
    pub async fn fetch_latest(&self) -> Result<LatestPrices> {
        let env: Envelope<LatestPrices> = self.get_json("/latest").await?;
        debug!(count = env.data.len(), "latest prices fetched");
        Ok(env.data)
    }

    /// GET /1h — one-hour averages and volumes per item.
    #[instrument(skip(self), name = "wiki::fetch_hourly")]
    pub async fn fetch_hourly(&self) -> Result<HourlyPrices> {
        let env: Envelope<HourlyPrices> = self.get_json("/1h").await?;
        debug!(count = env.data.len(), "hourly aggregates fetched");
        Ok(env.data)
    }

    /// GET /timeseries — bucketed history for a single item.
    #[instrument(skip(self), name = "wiki::fetch_timeseries")]
    pub async fn fetch_timeseries(
        &self,
        id: ItemId,
        timestep: Timestep,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let path = format!("/timeseries?timestep={timestep}&id={id}");
        let env: Envelope<Vec<TimeSeriesPoint>> = self.get_json(&path).await?;
        debug!(id, %timestep, count = env.data.len(), "time series fetched");
        Ok(env.data)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// GET `{base_url}{path}` and decode the JSON body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} returned {}: {}", path, status, body);
        }

        resp.json::<T>()
            .await
            .with_context(|| format!("failed to parse {path} response"))
    }
}

impl std::fmt::Debug for WikiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = WikiClient::new("http://localhost:1/api/", "test", Duration::from_secs(1));
        assert_eq!(c.base_url(), "http://localhost:1/api");
    }

    #[test]
    fn envelope_decodes_hourly_payload() {
        let json = r#"{"data": {"561": {"avgHighPrice": 170, "avgLowPrice": 165,
                       "highPriceVolume": 120000, "lowPriceVolume": 80000}},
                       "timestamp": 1700000000}"#;
        let env: Envelope<HourlyPrices> = serde_json::from_str(json).unwrap();
        assert_eq!(env.data[&561].total_volume(), 200_000);
    }

    #[test]
    fn envelope_decodes_timeseries_payload() {
        let json = r#"{"data": [
            {"timestamp": 1700000000, "avgHighPrice": 10, "avgLowPrice": null, "highPriceVolume": 3, "lowPriceVolume": 0},
            {"timestamp": 1700003600, "avgHighPrice": null, "avgLowPrice": 9, "highPriceVolume": 0, "lowPriceVolume": 4}
        ], "itemId": 2}"#;
        let env: Envelope<Vec<TimeSeriesPoint>> = serde_json::from_str(json).unwrap();
        assert_eq!(env.data.len(), 2);
        assert_eq!(env.data[1].avg_low_price, Some(9));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_error() {
        let c = WikiClient::new("http://127.0.0.1:9", "test", Duration::from_secs(2));
        assert!(c.fetch_latest().await.is_err());
    }
}
