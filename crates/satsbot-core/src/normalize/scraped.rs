use tracing::debug;

use crate::domain::{AssetRecord, RecordSet, MAGNITUDE_SUFFIXES};

/// Minimum number of cells a scraped row needs to be considered.
pub const MIN_CELLS: usize = 3;

/// Column positions of the fields inside a scraped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub rank: usize,
    pub name: usize,
    pub market_cap: usize,
}

impl ColumnLayout {
    pub fn min_cells(self) -> usize {
        (self.rank.max(self.name).max(self.market_cap) + 1).max(MIN_CELLS)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            rank: 0,
            name: 1,
            market_cap: 2,
        }
    }
}

/// Turns scraped row texts into at most ten ranked records.
///
/// Short rows and rows whose rank, name or market cap cannot be parsed are
/// skipped; scanning stops once the set is full.
pub fn normalize_rows<R: AsRef<[String]>>(rows: &[R], layout: ColumnLayout) -> Vec<AssetRecord> {
    let mut set = RecordSet::new();

    for (index, row) in rows.iter().enumerate() {
        if set.is_full() {
            break;
        }

        let cells = row.as_ref();
        if cells.len() < layout.min_cells() {
            set.reject();
            debug!(index, cells = cells.len(), "skipping short row");
            continue;
        }

        let Some(rank) = parse_rank(&cells[layout.rank]) else {
            set.reject();
            debug!(index, cell = %cells[layout.rank], "skipping row with unparseable rank");
            continue;
        };

        let (name, symbol) = split_name_symbol(&cells[layout.name]);

        let Some(market_cap) = parse_market_cap(&cells[layout.market_cap]) else {
            set.reject();
            debug!(index, cell = %cells[layout.market_cap], "skipping row with unparseable market cap");
            continue;
        };

        match AssetRecord::new(rank, name, symbol, market_cap) {
            Ok(record) => {
                if let Err(error) = set.push(record) {
                    debug!(index, %error, "skipping out-of-order row");
                }
            }
            Err(error) => {
                set.reject();
                debug!(index, %error, "skipping invalid row");
            }
        }
    }

    debug!(
        accepted = set.len(),
        skipped = set.rejected(),
        scanned = rows.len(),
        "normalized scraped rows"
    );

    set.into_records()
}

/// Parses a base-10 rank cell, ignoring surrounding whitespace.
pub fn parse_rank(cell: &str) -> Option<u32> {
    cell.trim().parse::<u32>().ok().filter(|rank| *rank > 0)
}

/// Splits a name cell into `(name, symbol)`.
///
/// A two-line cell yields line 1 as name and line 2 as symbol. Otherwise the
/// trailing whitespace-separated token is the symbol. A single token is a
/// name with an empty symbol.
pub fn split_name_symbol(cell: &str) -> (String, String) {
    let text = cell.trim();

    if text.contains('\n') {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let name = lines.next().unwrap_or_default();
        let symbol = lines.next().unwrap_or_default();
        return (name.to_owned(), symbol.to_owned());
    }

    match text.rfind(char::is_whitespace) {
        Some(split) => {
            let name = text[..split].trim_end();
            let symbol = text[split..].trim_start();
            (name.to_owned(), symbol.to_owned())
        }
        None => (text.to_owned(), String::new()),
    }
}

/// Parses a market-cap string such as `$1.50T`, `$950.00M` or `$2,345.00`
/// into US dollars.
pub fn parse_market_cap(cell: &str) -> Option<f64> {
    let compact: String = cell.chars().filter(|c| !c.is_whitespace()).collect();
    let without_currency = strip_currency(&compact);
    let digits = without_currency.replace(',', "");

    let (number, multiplier) = MAGNITUDE_SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| {
            digits
                .strip_suffix(*suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((digits.as_str(), 1.0));

    let value = number.parse::<f64>().ok()? * multiplier;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn strip_currency(text: &str) -> &str {
    const PREFIXES: [&str; 5] = ["US$", "$", "€", "£", "¥"];
    PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
}
