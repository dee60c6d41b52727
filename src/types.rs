// =============================================================================
// Shared types used across the RuneTerminal market service
// =============================================================================
//
// Wire shapes mirror the upstream price API (camelCase JSON). Every field the
// upstream may send as `null` is an `Option` or decodes to zero, so a single
// malformed record can never fail a whole poll.
// =============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::derivatives::margin::{calculate_margin, MarginResult};

/// Upstream item identifier.
pub type ItemId = u32;

/// Latest buy/sell snapshot per item id, as returned by `/latest`.
pub type LatestPrices = HashMap<ItemId, PriceSnapshot>;

/// One-hour aggregates per item id, as returned by `/1h`.
pub type HourlyPrices = HashMap<ItemId, HourlyAggregate>;

/// Static item catalog keyed by id.
pub type Catalog = HashMap<ItemId, AssetDescriptor>;

/// Decode `null` (or a missing field) as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Latest observed instant-buy (`high`) and instant-sell (`low`) prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    #[serde(default)]
    pub high: Option<i64>,
    #[serde(default)]
    pub high_time: Option<i64>,
    #[serde(default)]
    pub low: Option<i64>,
    #[serde(default)]
    pub low_time: Option<i64>,
}

impl PriceSnapshot {
    /// Margin for this snapshot; absent prices yield the neutral result.
    pub fn margin(&self) -> MarginResult {
        calculate_margin(self.high.unwrap_or(0), self.low.unwrap_or(0))
    }

    /// True when both sides of the book carry a positive price.
    pub fn is_two_sided(&self) -> bool {
        matches!((self.high, self.low), (Some(h), Some(l)) if h > 0 && l > 0)
    }
}

/// One-hour trade aggregate for a single item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAggregate {
    #[serde(default)]
    pub avg_high_price: Option<i64>,
    #[serde(default)]
    pub avg_low_price: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_price_volume: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low_price_volume: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
}

impl HourlyAggregate {
    /// Combined buy + sell volume for the hour.
    pub fn total_volume(&self) -> u64 {
        self.high_price_volume.saturating_add(self.low_price_volume)
    }
}

/// Static catalog entry from `/mapping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub examine: String,
    #[serde(default)]
    pub members: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowalch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highalch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub icon: String,
}

/// One bucket of the per-item time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp: i64,
    #[serde(default)]
    pub avg_high_price: Option<i64>,
    #[serde(default)]
    pub avg_low_price: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high_price_volume: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low_price_volume: u64,
}

/// Bucket width accepted by the upstream `/timeseries` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timestep {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
}

impl std::fmt::Display for Timestep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FiveMinutes => write!(f, "5m"),
            Self::OneHour => write!(f, "1h"),
            Self::SixHours => write!(f, "6h"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_map_decodes_string_keys_and_nulls() {
        let json = r#"{
            "2": {"high": 180, "highTime": 1700000000, "low": 175, "lowTime": 1700000010},
            "6": {"high": null, "highTime": null, "low": 190000, "lowTime": 1700000020}
        }"#;
        let prices: LatestPrices = serde_json::from_str(json).unwrap();
        assert_eq!(prices[&2].high, Some(180));
        assert!(prices[&2].is_two_sided());
        assert_eq!(prices[&6].high, None);
        assert!(!prices[&6].is_two_sided());
    }

    #[test]
    fn hourly_null_volume_decodes_as_zero() {
        let json = r#"{"avgHighPrice": null, "avgLowPrice": 12, "highPriceVolume": null, "lowPriceVolume": 40, "timestamp": 1700000000}"#;
        let agg: HourlyAggregate = serde_json::from_str(json).unwrap();
        assert_eq!(agg.avg_high_price, None);
        assert_eq!(agg.high_price_volume, 0);
        assert_eq!(agg.total_volume(), 40);
    }

    #[test]
    fn snapshot_margin_treats_missing_side_as_neutral() {
        let snap = PriceSnapshot {
            high: Some(1000),
            low: None,
            ..Default::default()
        };
        assert_eq!(snap.margin(), MarginResult::default());
    }

    #[test]
    fn descriptor_optional_fields() {
        let json = r#"{"id": 4151, "name": "Abyssal whip", "examine": "A weapon from the abyss.",
                       "members": true, "highalch": 72000, "limit": 70, "value": 120001, "icon": "Abyssal whip.png"}"#;
        let d: AssetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.highalch, Some(72000));
        assert_eq!(d.lowalch, None);
        assert!(d.members);
    }

    #[test]
    fn timestep_wire_names() {
        assert_eq!(Timestep::FiveMinutes.to_string(), "5m");
        let t: Timestep = serde_json::from_str("\"6h\"").unwrap();
        assert_eq!(t, Timestep::SixHours);
        assert_eq!(Timestep::default(), Timestep::OneHour);
    }
}
