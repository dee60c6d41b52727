// =============================================================================
// Flipping Screener — filter and rank margin opportunities
// =============================================================================
//
// Joins the catalog, the latest price snapshot and the latest hourly volume,
// then keeps items that pass every filter:
//
//   1. Two-sided book        — both high and low quoted and non-zero
//   2. Members               — optionally drop members-only items
//   3. Item sink             — optionally drop sink-regulated items
//   4. Minimum profit (gp)   — post-tax margin
//   5. Minimum ROI (%)
//   6. Minimum hourly volume
//
// Rows are sorted by profit, highest first.

use serde::{Deserialize, Serialize};

use crate::derivatives::MarginResult;
use crate::market_data::is_sink_item;
use crate::types::{Catalog, HourlyPrices, ItemId, LatestPrices};

/// Screener filter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipFilters {
    #[serde(default)]
    pub min_profit: i64,
    #[serde(default)]
    pub min_roi: f64,
    #[serde(default)]
    pub min_volume: u64,
    #[serde(default)]
    pub members_only: bool,
    #[serde(default)]
    pub hide_sink_items: bool,
}

/// One ranked flip candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlipRow {
    pub id: ItemId,
    pub name: String,
    pub high: i64,
    pub low: i64,
    pub margin: MarginResult,
    pub volume: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Build the screener table from the current market view.
pub fn build_flip_table(
    catalog: &Catalog,
    latest: &LatestPrices,
    hourly: &HourlyPrices,
    filters: &FlipFilters,
) -> Vec<FlipRow> {
    let mut rows: Vec<FlipRow> = latest
        .iter()
        .filter_map(|(id, snap)| {
            let details = catalog.get(id)?;
            let agg = hourly.get(id)?;
            let (high, low) = (snap.high?, snap.low?);
            if high == 0 || low == 0 {
                return None;
            }

            if filters.members_only && !details.members {
                return None;
            }
            if filters.hide_sink_items && is_sink_item(*id) {
                return None;
            }

            let margin = snap.margin();
            let volume = agg.total_volume();
            if margin.profit < filters.min_profit
                || margin.roi < filters.min_roi
                || volume < filters.min_volume
            {
                return None;
            }

            Some(FlipRow {
                id: *id,
                name: details.name.clone(),
                high,
                low,
                margin,
                volume,
                limit: details.limit,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.margin.profit.cmp(&a.margin.profit).then(a.id.cmp(&b.id)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetDescriptor, HourlyAggregate, PriceSnapshot};

    fn market() -> (Catalog, LatestPrices, HourlyPrices) {
        let mut catalog = Catalog::new();
        let mut latest = LatestPrices::new();
        let mut hourly = HourlyPrices::new();

        let mut add = |id: ItemId, name: &str, members: bool, high: i64, low: i64, volume: u64| {
            catalog.insert(
                id,
                AssetDescriptor {
                    id,
                    name: name.to_string(),
                    examine: String::new(),
                    members,
                    lowalch: None,
                    highalch: None,
                    limit: Some(100),
                    value: 1,
                    icon: String::new(),
                },
            );
            latest.insert(
                id,
                PriceSnapshot {
                    high: Some(high),
                    high_time: Some(0),
                    low: Some(low),
                    low_time: Some(0),
                },
            );
            hourly.insert(
                id,
                HourlyAggregate {
                    avg_high_price: Some(high),
                    avg_low_price: Some(low),
                    high_price_volume: volume,
                    low_price_volume: 0,
                    timestamp: 0,
                },
            );
        };

        add(2, "Cannonball", false, 200, 180, 900_000); // profit 16
        add(4151, "Abyssal whip", true, 1_500_000, 1_400_000, 400); // profit 70 000
        add(20997, "Twisted bow", true, 1_200_000_000, 1_150_000_000, 10); // sink, profit 45M
        add(1, "Toolkit", false, 0, 10, 10); // one-sided

        (catalog, latest, hourly)
    }

    #[test]
    fn ranks_by_profit_and_skips_one_sided() {
        let (catalog, latest, hourly) = market();
        let rows = build_flip_table(&catalog, &latest, &hourly, &FlipFilters::default());
        let ids: Vec<ItemId> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![20997, 4151, 2]);
        assert_eq!(rows[1].margin.tax, 30_000);
        assert_eq!(rows[1].margin.profit, 70_000);
    }

    #[test]
    fn hides_sink_items() {
        let (catalog, latest, hourly) = market();
        let filters = FlipFilters {
            hide_sink_items: true,
            ..Default::default()
        };
        let rows = build_flip_table(&catalog, &latest, &hourly, &filters);
        assert!(rows.iter().all(|r| r.id != 20997));
    }

    #[test]
    fn members_only_and_thresholds() {
        let (catalog, latest, hourly) = market();
        let filters = FlipFilters {
            members_only: true,
            min_volume: 100,
            ..Default::default()
        };
        let rows = build_flip_table(&catalog, &latest, &hourly, &filters);
        let ids: Vec<ItemId> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4151]);

        let filters = FlipFilters {
            min_roi: 5.0,
            ..Default::default()
        };
        let rows = build_flip_table(&catalog, &latest, &hourly, &filters);
        assert!(rows.iter().all(|r| r.margin.roi >= 5.0));
        assert!(rows.iter().any(|r| r.id == 2)); // 16/180 = 8.9%
    }

    #[test]
    fn requires_hourly_data() {
        let (catalog, latest, _) = market();
        let rows = build_flip_table(&catalog, &latest, &HourlyPrices::new(), &FlipFilters::default());
        assert!(rows.is_empty());
    }
}
