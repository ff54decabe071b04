//! Record normalization: structured payloads and scraped listing pages both
//! end up as at most ten ranked [`AssetRecord`](crate::AssetRecord)s.

pub mod page;
pub mod scraped;
pub mod structured;

pub use page::{extract_rows, parse_selectors, MatchedRows, RowSelector, DEFAULT_ROW_SELECTORS};
pub use scraped::{normalize_rows, parse_market_cap, parse_rank, split_name_symbol, ColumnLayout};
pub use structured::{normalize_structured, EntryLocation, PayloadShape};
