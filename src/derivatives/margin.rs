// =============================================================================
// Flip Margin — net profit after Grand Exchange tax
// =============================================================================
//
// Buying at the instant-sell price (`low`) and selling at the instant-buy price
// (`high`) yields:
//
//   tax    = min(floor(high * 2%), 5 000 000)
//   profit = high - low - tax
//   roi    = profit / low * 100
//
// Tax is computed in integer arithmetic (`high / 50`) so it is exact for every
// price the upstream can report.

use serde::{Deserialize, Serialize};

/// Divisor equivalent to the 2% sale tax.
const GE_TAX_DIVISOR: i64 = 50;

/// Maximum absolute tax charged on a single sale.
pub const GE_TAX_CAP: i64 = 5_000_000;

/// Result of a margin calculation for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginResult {
    pub profit: i64,
    pub tax: i64,
    /// Return on investment as a percentage.
    pub roi: f64,
}

/// Compute the post-tax flip margin for a `high`/`low` pair.
///
/// Returns the neutral result when either side is non-positive: there is no
/// trade signal without a two-sided book.
pub fn calculate_margin(high: i64, low: i64) -> MarginResult {
    if high <= 0 || low <= 0 {
        return MarginResult::default();
    }

    let tax = (high / GE_TAX_DIVISOR).min(GE_TAX_CAP);
    let profit = high - low - tax;
    let roi = (profit as f64 / low as f64) * 100.0;

    MarginResult { profit, tax, roi }
}
