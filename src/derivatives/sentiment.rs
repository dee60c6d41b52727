// =============================================================================
// Market Sentiment & Top Movers
// =============================================================================
//
// Sentiment is the share of advancing items among all items whose average
// instant-buy price moved between the previous and latest hourly generations:
//
//   sentiment = gainers / (gainers + losers) * 100
//
// Unchanged prices count as neither.  With nothing comparable the reading is
// the neutral midpoint, 50.

use std::cmp::Ordering;

use serde::Serialize;

use crate::derivatives::index::percent_change;
use crate::types::{HourlyPrices, ItemId};

/// Neutral reading when no item is comparable.
const NEUTRAL_SENTIMENT: f64 = 50.0;

/// Gainer/loser counts alongside the resulting sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub sentiment: f64,
    pub gainers: usize,
    pub losers: usize,
}

/// A single item's hourly price move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub id: ItemId,
    pub change_pct: f64,
    pub avg_high_price: i64,
    pub volume: u64,
}

/// Largest advances and declines, each ordered by magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

/// Iterate `(id, current, previous)` average-high pairs present in both maps.
///
/// A zero average is a partial record and is not comparable.
fn comparable_pairs<'a>(
    latest: &'a HourlyPrices,
    previous: &'a HourlyPrices,
) -> impl Iterator<Item = (ItemId, i64, i64)> + 'a {
    latest.iter().filter_map(|(id, agg)| {
        let curr = agg.avg_high_price.filter(|&p| p > 0)?;
        let prev = previous.get(id)?.avg_high_price.filter(|&p| p > 0)?;
        Some((*id, curr, prev))
    })
}

/// Count gainers and losers and derive the sentiment percentage.
pub fn sentiment_breakdown(latest: &HourlyPrices, previous: &HourlyPrices) -> SentimentBreakdown {
    let (gainers, losers) =
        comparable_pairs(latest, previous).fold((0, 0), |(g, l), (_, curr, prev)| {
            match curr.cmp(&prev) {
                Ordering::Greater => (g + 1, l),
                Ordering::Less => (g, l + 1),
                Ordering::Equal => (g, l),
            }
        });

    let sentiment = if gainers + losers == 0 {
        NEUTRAL_SENTIMENT
    } else {
        (gainers as f64 / (gainers + losers) as f64) * 100.0
    };

    SentimentBreakdown {
        sentiment,
        gainers,
        losers,
    }
}

/// Market sentiment in `[0, 100]`.
pub fn market_sentiment(latest: &HourlyPrices, previous: &HourlyPrices) -> f64 {
    sentiment_breakdown(latest, previous).sentiment
}

fn by_magnitude(a: &Mover, b: &Mover) -> Ordering {
    a.change_pct
        .partial_cmp(&b.change_pct)
        .unwrap_or(Ordering::Equal)
}

/// Top `limit` gainers and losers by percent change.
///
/// Ties are broken by id so the output is stable across calls.
pub fn top_movers(latest: &HourlyPrices, previous: &HourlyPrices, limit: usize) -> Movers {
    let (mut gainers, mut losers): (Vec<Mover>, Vec<Mover>) = comparable_pairs(latest, previous)
        .filter_map(|(id, curr, prev)| {
            let change_pct = percent_change(curr, prev)?;
            let volume = latest.get(&id).map(|a| a.total_volume()).unwrap_or(0);
            Some(Mover {
                id,
                change_pct,
                avg_high_price: curr,
                volume,
            })
        })
        .filter(|m| m.change_pct != 0.0)
        .partition(|m| m.change_pct > 0.0);

    gainers.sort_by(|a, b| by_magnitude(b, a).then(a.id.cmp(&b.id)));
    losers.sort_by(|a, b| by_magnitude(a, b).then(a.id.cmp(&b.id)));
    gainers.truncate(limit);
    losers.truncate(limit);

    Movers { gainers, losers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HourlyAggregate;

    fn agg(avg_high: Option<i64>) -> HourlyAggregate {
        HourlyAggregate {
            avg_high_price: avg_high,
            high_price_volume: 10,
            low_price_volume: 5,
            ..Default::default()
        }
    }

    fn maps(pairs: &[(ItemId, Option<i64>, Option<i64>)]) -> (HourlyPrices, HourlyPrices) {
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        for &(id, curr, prev) in pairs {
            latest.insert(id, agg(curr));
            previous.insert(id, agg(prev));
        }
        (latest, previous)
    }

    #[test]
    fn neutral_without_overlap() {
        let mut latest = HourlyPrices::new();
        let mut previous = HourlyPrices::new();
        latest.insert(1, agg(Some(10)));
        previous.insert(2, agg(Some(10)));
        assert_eq!(market_sentiment(&latest, &previous), 50.0);
        assert_eq!(market_sentiment(&HourlyPrices::new(), &HourlyPrices::new()), 50.0);
    }

    #[test]
    fn neutral_when_nothing_moved() {
        let (latest, previous) = maps(&[(1, Some(10), Some(10)), (2, None, Some(3))]);
        let b = sentiment_breakdown(&latest, &previous);
        assert_eq!(b.sentiment, 50.0);
        assert_eq!((b.gainers, b.losers), (0, 0));
    }

    #[test]
    fn ratio_of_gainers() {
        let (latest, previous) = maps(&[
            (1, Some(11), Some(10)),
            (2, Some(12), Some(10)),
            (3, Some(13), Some(10)),
            (4, Some(9), Some(10)),
            (5, Some(10), Some(10)),
        ]);
        let b = sentiment_breakdown(&latest, &previous);
        assert_eq!((b.gainers, b.losers), (3, 1));
        assert!((b.sentiment - 75.0).abs() < 1e-12);
    }

    #[test]
    fn all_losers_is_zero() {
        let (latest, previous) = maps(&[(1, Some(5), Some(10)), (2, Some(1), Some(10))]);
        assert_eq!(market_sentiment(&latest, &previous), 0.0);
    }

    #[test]
    fn top_movers_orders_by_magnitude() {
        let (latest, previous) = maps(&[
            (1, Some(110), Some(100)), // +10
            (2, Some(150), Some(100)), // +50
            (3, Some(90), Some(100)),  // -10
            (4, Some(40), Some(100)),  // -60
            (5, Some(100), Some(100)), // flat
            (6, Some(120), Some(0)),   // no baseline
        ]);
        let movers = top_movers(&latest, &previous, 5);
        let gainers: Vec<ItemId> = movers.gainers.iter().map(|m| m.id).collect();
        let losers: Vec<ItemId> = movers.losers.iter().map(|m| m.id).collect();
        assert_eq!(gainers, vec![2, 1]);
        assert_eq!(losers, vec![4, 3]);
        assert_eq!(movers.gainers[0].volume, 15);
    }

    #[test]
    fn zero_average_is_not_comparable() {
        let (latest, previous) = maps(&[(1, Some(100), Some(0)), (2, Some(0), Some(100))]);
        let b = sentiment_breakdown(&latest, &previous);
        assert_eq!((b.gainers, b.losers), (0, 0));
        assert_eq!(b.sentiment, 50.0);

        let (latest, previous) = maps(&[
            (1, Some(100), Some(0)),
            (2, Some(110), Some(100)),
            (3, Some(90), Some(100)),
        ]);
        assert_eq!(market_sentiment(&latest, &previous), 50.0);
    }

    #[test]
    fn tied_movers_are_ordered_by_id() {
        let (latest, previous) = maps(&[
            (3, Some(50), Some(100)),
            (1, Some(50), Some(100)),
            (2, Some(50), Some(100)),
            (6, Some(150), Some(100)),
            (4, Some(150), Some(100)),
            (5, Some(150), Some(100)),
        ]);
        let movers = top_movers(&latest, &previous, 5);
        let gainers: Vec<ItemId> = movers.gainers.iter().map(|m| m.id).collect();
        let losers: Vec<ItemId> = movers.losers.iter().map(|m| m.id).collect();
        assert_eq!(gainers, vec![4, 5, 6]);
        assert_eq!(losers, vec![1, 2, 3]);
    }

    #[test]
    fn top_movers_respects_limit() {
        let (latest, previous) = maps(&[
            (1, Some(110), Some(100)),
            (2, Some(120), Some(100)),
            (3, Some(130), Some(100)),
        ]);
        let movers = top_movers(&latest, &previous, 2);
        assert_eq!(movers.gainers.len(), 2);
        assert_eq!(movers.gainers[0].id, 3);
        assert!(movers.losers.is_empty());
    }
}
