//! Row extraction from listing pages using an ordered list of CSS selectors.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{NormalizeError, ValidationError};

/// Row selectors tried against the public listing page, highest priority
/// first.
pub const DEFAULT_ROW_SELECTORS: [&str; 4] = [
    "table.marketcap-table tbody tr",
    "#cryptocurrencies tbody tr",
    "div.table-container table tbody tr",
    "table tbody tr",
];

/// A compiled row selector that remembers its source text.
#[derive(Debug, Clone)]
pub struct RowSelector {
    source: String,
    selector: Selector,
}

impl RowSelector {
    pub fn parse(source: impl Into<String>) -> Result<Self, ValidationError> {
        let source = source.into();
        let selector = Selector::parse(&source).map_err(|_| ValidationError::InvalidSelector {
            value: source.clone(),
        })?;
        Ok(Self { source, selector })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Parses selector strings in order, keeping that order as priority.
pub fn parse_selectors<I, S>(sources: I) -> Result<Vec<RowSelector>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    sources.into_iter().map(|source| RowSelector::parse(source)).collect()
}

/// Rows produced by the first selector that matched anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRows {
    pub selector: String,
    pub rows: Vec<Vec<String>>,
}

struct PageDiagnostics {
    title: Option<String>,
    table_count: usize,
}

/// Selects table rows with the first selector that yields at least one row.
///
/// Rows from different selectors are never merged. When nothing matches the
/// error carries the page title and table count.
pub fn extract_rows(html: &str, selectors: &[RowSelector]) -> Result<MatchedRows, NormalizeError> {
    let document = Html::parse_document(html);

    for selector in selectors {
        let rows = document
            .select(&selector.selector)
            .map(|row| row_cells(&row))
            .collect::<Vec<_>>();

        if rows.is_empty() {
            debug!(selector = selector.as_str(), "row selector matched nothing");
            continue;
        }

        debug!(
            selector = selector.as_str(),
            rows = rows.len(),
            "row selector matched"
        );
        return Ok(MatchedRows {
            selector: selector.source.clone(),
            rows,
        });
    }

    let diagnostics = diagnose(&document);
    Err(NormalizeError::NoRowsFound {
        selectors_tried: selectors.len(),
        title: diagnostics.title,
        table_count: diagnostics.table_count,
    })
}

fn diagnose(document: &Html) -> PageDiagnostics {
    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|title| title.text().collect::<String>().trim().to_owned())
            .filter(|title| !title.is_empty())
    });
    let table_count = Selector::parse("table")
        .map(|selector| document.select(&selector).count())
        .unwrap_or(0);

    PageDiagnostics { title, table_count }
}

fn row_cells(row: &ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| cell_text(&cell))
        .collect()
}

/// Trimmed, non-empty text nodes of a cell joined by newlines, so that
/// stacked elements (`<div>Bitcoin</div><div>BTC</div>`) read as two lines.
fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
