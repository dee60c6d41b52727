// =============================================================================
// Price Database — catalog search joined with live prices
// =============================================================================
//
// Case-insensitive substring search over item names.  Matches are ordered by
// id and capped, then joined with the latest snapshot and watchlist status.
// An empty query matches every item.

use serde::Serialize;

use crate::types::{AssetDescriptor, Catalog, ItemId, LatestPrices, PriceSnapshot};

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    pub item: AssetDescriptor,
    pub price: Option<PriceSnapshot>,
    pub watchlisted: bool,
}

/// Search `catalog` for names containing `query`, returning at most `limit`
/// rows ordered by id.
pub fn search_catalog(
    catalog: &Catalog,
    latest: &LatestPrices,
    watchlist: &[ItemId],
    query: &str,
    limit: usize,
) -> Vec<CatalogRow> {
    let needle = query.trim().to_lowercase();

    let mut hits: Vec<&AssetDescriptor> = catalog
        .values()
        .filter(|d| needle.is_empty() || d.name.to_lowercase().contains(&needle))
        .collect();
    hits.sort_unstable_by_key(|d| d.id);

    hits.into_iter()
        .take(limit)
        .map(|d| CatalogRow {
            item: d.clone(),
            price: latest.get(&d.id).copied(),
            watchlisted: watchlist.contains(&d.id),
        })
        .collect()
}
