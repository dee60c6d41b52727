pub mod baskets;
pub mod cache;
pub mod generations;

// Re-export for convenient access (e.g. `use crate::market_data::MarketCache`).
pub use baskets::{is_sink_item, Basket};
pub use cache::{CacheStatus, MarketCache};
pub use generations::Generations;
