// =============================================================================
// Market Derivatives Engine
// =============================================================================
//
// Pure, side-effect-free transformations from raw price snapshots into trading
// signals.  No function in this module performs I/O, holds state, or fails:
// missing or malformed optional fields always resolve to an explicit neutral
// value so that a caller can render whatever data it has.

pub mod alch;
pub mod dump;
pub mod index;
pub mod margin;
pub mod sentiment;

pub use alch::{calculate_alch_profit, nature_price, AlchResult, NATURE_RUNE_ID};
pub use dump::{find_dumps, is_dump_item, DumpThresholds};
pub use index::{calculate_index_performance, percent_change};
pub use margin::{calculate_margin, MarginResult, GE_TAX_CAP};
pub use sentiment::{
    market_sentiment, sentiment_breakdown, top_movers, Mover, Movers, SentimentBreakdown,
};
