// =============================================================================
// Dump Detector — high-volume, sharp-drop events within one hour
// =============================================================================
//
// An item is flagged when BOTH conditions hold, each compared strictly:
//
//   total_volume(current)                        > min_hourly_volume
//   (prev_avg_high - curr_avg_high) / prev * 100 > min_drop_pct
//
// Without a previous generation, or without both averages, there is no
// baseline and the item is never flagged.

use serde::{Deserialize, Serialize};

use crate::types::{HourlyAggregate, HourlyPrices, ItemId};

fn default_min_hourly_volume() -> u64 {
    10_000
}

fn default_min_drop_pct() -> f64 {
    10.0
}

/// Tunable cut-offs for [`is_dump_item`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DumpThresholds {
    /// Hourly volume (buy + sell) that must be exceeded.
    #[serde(default = "default_min_hourly_volume")]
    pub min_hourly_volume: u64,

    /// Percentage fall in average instant-buy price that must be exceeded.
    #[serde(default = "default_min_drop_pct")]
    pub min_drop_pct: f64,
}

impl Default for DumpThresholds {
    fn default() -> Self {
        Self {
            min_hourly_volume: default_min_hourly_volume(),
            min_drop_pct: default_min_drop_pct(),
        }
    }
}

/// Whether `current` looks like a liquidation relative to `previous`.
pub fn is_dump_item(
    current: &HourlyAggregate,
    previous: Option<&HourlyAggregate>,
    thresholds: &DumpThresholds,
) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    let (Some(curr), Some(prev)) = (current.avg_high_price, previous.avg_high_price) else {
        return false;
    };
    if prev <= 0 {
        return false;
    }

    if current.total_volume() <= thresholds.min_hourly_volume {
        return false;
    }

    let drop_pct = ((prev - curr) as f64 * 100.0) / prev as f64;
    drop_pct > thresholds.min_drop_pct
}

/// Every id in `latest` flagged by [`is_dump_item`], sorted ascending.
pub fn find_dumps(
    latest: &HourlyPrices,
    previous: &HourlyPrices,
    thresholds: &DumpThresholds,
) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = latest
        .iter()
        .filter(|(id, agg)| is_dump_item(agg, previous.get(*id), thresholds))
        .map(|(id, _)| *id)
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(avg_high: Option<i64>, volume: u64) -> HourlyAggregate {
        HourlyAggregate {
            avg_high_price: avg_high,
            avg_low_price: avg_high,
            high_price_volume: volume / 2,
            low_price_volume: volume - volume / 2,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn never_flags_without_previous() {
        let t = DumpThresholds::default();
        assert!(!is_dump_item(&agg(Some(1), u64::MAX / 4), None, &t));
    }

    #[test]
    fn flags_high_volume_sharp_drop() {
        let t = DumpThresholds::default();
        let prev = agg(Some(1000), 500);
        let curr = agg(Some(850), 50_000);
        assert!(is_dump_item(&curr, Some(&prev), &t));
    }

    #[test]
    fn requires_both_conditions() {
        let t = DumpThresholds::default();
        let prev = agg(Some(1000), 500);
        // Sharp drop, thin volume.
        assert!(!is_dump_item(&agg(Some(500), 100), Some(&prev), &t));
        // Heavy volume, small drop.
        assert!(!is_dump_item(&agg(Some(950), 50_000), Some(&prev), &t));
    }

    #[test]
    fn thresholds_are_strict() {
        let t = DumpThresholds {
            min_hourly_volume: 1_000,
            min_drop_pct: 10.0,
        };
        let prev = agg(Some(1000), 0);
        // Exactly 10% drop is not enough.
        assert!(!is_dump_item(&agg(Some(900), 5_000), Some(&prev), &t));
        // Exactly the volume threshold is not enough.
        assert!(!is_dump_item(&agg(Some(800), 1_000), Some(&prev), &t));
        assert!(is_dump_item(&agg(Some(800), 1_001), Some(&prev), &t));
    }

    #[test]
    fn missing_averages_are_incomparable() {
        let t = DumpThresholds::default();
        assert!(!is_dump_item(&agg(None, 50_000), Some(&agg(Some(1000), 0)), &t));
        assert!(!is_dump_item(&agg(Some(1), 50_000), Some(&agg(None, 0)), &t));
        assert!(!is_dump_item(&agg(Some(1), 50_000), Some(&agg(Some(0), 0)), &t));
    }

    #[test]
    fn find_dumps_is_sorted() {
        let t = DumpThresholds::default();
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        for id in [30, 10, 20] {
            latest.insert(id, agg(Some(100), 20_000));
            previous.insert(id, agg(Some(200), 0));
        }
        latest.insert(40, agg(Some(100), 20_000));
        assert_eq!(find_dumps(&latest, &previous, &t), vec![10, 20, 30]);
    }
}
