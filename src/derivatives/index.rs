// =============================================================================
// Sector Index Performance
// =============================================================================
//
// Equal-weight basket index: the arithmetic mean of each member's percent
// change in average instant-buy price between the previous and latest hourly
// generations.  Members lacking a current price or a non-zero previous price
// are dropped from both the sum and the count.

use crate::types::{HourlyPrices, ItemId};

/// `(current - previous) / previous * 100`, or `None` when `previous` is 0.
pub fn percent_change(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some(((current - previous) as f64 * 100.0) / previous as f64)
}

/// Mean percent change across the qualifying members of `ids`.
///
/// Returns 0.0 for an empty basket or when no member qualifies.
pub fn calculate_index_performance(
    ids: &[ItemId],
    latest: &HourlyPrices,
    previous: &HourlyPrices,
) -> f64 {
    let (sum, count) = ids
        .iter()
        .filter_map(|id| {
            let curr = latest.get(id)?.avg_high_price?;
            let prev = previous.get(id)?.avg_high_price?;
            percent_change(curr, prev)
        })
        .fold((0.0, 0usize), |(sum, n), change| (sum + change, n + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HourlyAggregate;

    fn with_price(map: &mut HourlyPrices, id: ItemId, avg_high: Option<i64>) {
        map.insert(
            id,
            HourlyAggregate {
                avg_high_price: avg_high,
                ..Default::default()
            },
        );
    }

    #[test]
    fn percent_change_guards_zero() {
        assert_eq!(percent_change(10, 0), None);
        assert_eq!(percent_change(110, 100), Some(10.0));
        assert_eq!(percent_change(50, 100), Some(-50.0));
    }

    #[test]
    fn empty_basket_is_zero() {
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        with_price(&mut latest, 1, Some(200));
        with_price(&mut previous, 1, Some(100));
        assert_eq!(calculate_index_performance(&[], &latest, &previous), 0.0);
    }

    #[test]
    fn members_without_history_are_excluded() {
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        with_price(&mut latest, 1, Some(110)); // +10%
        with_price(&mut previous, 1, Some(100));
        with_price(&mut latest, 2, Some(180)); // -10%
        with_price(&mut previous, 2, Some(200));
        with_price(&mut latest, 3, Some(999)); // no previous entry

        let perf = calculate_index_performance(&[1, 2, 3], &latest, &previous);
        assert!(perf.abs() < 1e-12, "got {perf}");

        with_price(&mut latest, 2, Some(240)); // +20%
        let perf = calculate_index_performance(&[1, 2, 3], &latest, &previous);
        assert!((perf - 15.0).abs() < 1e-12, "got {perf}");
    }

    #[test]
    fn null_and_zero_previous_are_excluded() {
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        with_price(&mut latest, 1, Some(150));
        with_price(&mut previous, 1, Some(100));
        with_price(&mut latest, 2, Some(150));
        with_price(&mut previous, 2, Some(0));
        with_price(&mut latest, 3, None);
        with_price(&mut previous, 3, Some(100));

        let perf = calculate_index_performance(&[1, 2, 3], &latest, &previous);
        assert!((perf - 50.0).abs() < 1e-12);
    }

    #[test]
    fn no_qualifying_member_is_zero() {
        let latest = HourlyPrices::new();
        let previous = HourlyPrices::new();
        assert_eq!(calculate_index_performance(&[1, 2], &latest, &previous), 0.0);
    }
}
