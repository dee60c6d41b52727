// =============================================================================
// High Alchemy Profit
// =============================================================================
//
// Casting High Level Alchemy converts an item into its fixed `highalch` coin
// value at the cost of one nature rune:
//
//   profit = highalch - buy_price - nature_price
//   roi    = profit / (buy_price + nature_price) * 100

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, LatestPrices};

/// Catalog id of the nature rune consumed by every cast.
pub const NATURE_RUNE_ID: ItemId = 561;

/// Result of an alchemy profitability calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlchResult {
    pub profit: i64,
    /// Return on investment as a percentage.
    pub roi: f64,
    pub nature_cost: i64,
}

/// Current nature rune price (its `low`), or 0 when not quoted.
pub fn nature_price(latest: &LatestPrices) -> i64 {
    latest
        .get(&NATURE_RUNE_ID)
        .and_then(|p| p.low)
        .filter(|&p| p > 0)
        .unwrap_or(0)
}

/// Profit from buying an item at `buy_price` and alching it.
pub fn calculate_alch_profit(high_alch: i64, buy_price: i64, nature_price: i64) -> AlchResult {
    if buy_price <= 0 {
        return AlchResult {
            profit: 0,
            roi: 0.0,
            nature_cost: nature_price,
        };
    }

    let profit = high_alch - buy_price - nature_price;
    let cost = buy_price + nature_price;
    let roi = if cost != 0 {
        (profit as f64 / cost as f64) * 100.0
    } else {
        0.0
    };

    AlchResult {
        profit,
        roi,
        nature_cost: nature_price,
    }
}
