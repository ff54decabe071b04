use std::fmt::Write;

use crate::domain::MAGNITUDE_SUFFIXES;
use crate::AssetRecord;

/// Dollar amount shortened with the largest magnitude suffix that keeps the
/// mantissa at or above one: `$1.23T`, `$950.00M`, `$12.50`.
pub fn abbreviate_usd(value: f64) -> String {
    for (suffix, magnitude) in MAGNITUDE_SUFFIXES {
        if value.abs() >= magnitude {
            return format!("${:.2}{suffix}", value / magnitude);
        }
    }
    format!("${value:.2}")
}

/// Chat-ready listing of ranked assets, one line per record.
pub fn render_top_assets(records: &[AssetRecord]) -> String {
    let mut output = format!("Top {} assets by market cap:", records.len());
    for record in records {
        let _ = write!(output, "\n#{} {}", record.rank, record.name);
        if !record.symbol.is_empty() {
            let _ = write!(output, " ({})", record.symbol);
        }
        let _ = write!(output, ": {}", abbreviate_usd(record.market_cap_usd));
    }
    output
}
