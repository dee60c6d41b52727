// =============================================================================
// RuneTerminal — market analytics service for the Grand Exchange
// =============================================================================

pub mod api;
pub mod app_state;
pub mod derivatives;
pub mod flipping;
pub mod market_data;
pub mod price_database;
pub mod runtime_config;
pub mod storage;
pub mod types;
pub mod watchlist;
pub mod wiki;
