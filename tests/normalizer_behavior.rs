//! Behavior-driven tests for the record normalizer
//!
//! These tests verify how structured payloads and scraped listing rows are
//! turned into ranked asset records, and which malformed inputs are skipped.

use satsbot_core::normalize::{
    extract_rows, normalize_rows, normalize_structured, parse_market_cap, parse_selectors,
    split_name_symbol, ColumnLayout, PayloadShape, DEFAULT_ROW_SELECTORS,
};
use satsbot_core::{NormalizeError, MAX_RECORDS};

fn canonical_entries(count: u32) -> String {
    let entries = (1..=count)
        .map(|rank| {
            format!(
                r#"{{"rank":{rank},"name":"Asset {rank}","symbol":"A{rank}","marketCap":{}}}"#,
                f64::from(1_000 - rank) * 1.0e9
            )
        })
        .collect::<Vec<_>>();
    format!("[{}]", entries.join(","))
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| (*cell).to_owned()).collect()
}

// =============================================================================
// Structured payloads
// =============================================================================

#[test]
fn when_payload_has_ten_or_fewer_entries_every_entry_is_kept_in_order() {
    // Given: A canonical payload with seven valid entries
    let body = canonical_entries(7);

    // When: The payload is normalized
    let records = normalize_structured(&body, &PayloadShape::canonical()).expect("valid payload");

    // Then: Length and rank order are preserved
    assert_eq!(records.len(), 7);
    let ranks = records.iter().map(|record| record.rank).collect::<Vec<_>>();
    assert_eq!(ranks, (1..=7).collect::<Vec<_>>());
    assert_eq!(records[0].name, "Asset 1");
    assert_eq!(records[0].market_cap_usd, 999.0e9);
}

#[test]
fn when_payload_has_more_than_ten_entries_only_the_first_ten_are_kept() {
    // Given: A payload with fourteen entries
    let body = canonical_entries(14);

    // When: The payload is normalized
    let records = normalize_structured(&body, &PayloadShape::canonical()).expect("valid payload");

    // Then: Exactly the first ten survive
    assert_eq!(records.len(), MAX_RECORDS);
    assert_eq!(records.last().map(|record| record.rank), Some(10));
}

#[test]
fn when_one_entry_is_broken_the_rest_are_still_returned() {
    // Given: A payload whose second entry lacks a market cap
    let body = r#"[
        {"rank": 1, "name": "Bitcoin", "symbol": "BTC", "marketCap": 1.5e12},
        {"rank": 2, "name": "Ethereum", "symbol": "ETH"},
        {"rank": 3, "name": "Tether", "symbol": "USDT", "marketCap": 1.1e11}
    ]"#;

    // When: The payload is normalized
    let records = normalize_structured(body, &PayloadShape::canonical()).expect("partial payload");

    // Then: The broken entry is skipped
    let names = records.iter().map(|record| record.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Bitcoin", "Tether"]);
}

#[test]
fn when_payload_is_not_an_array_it_is_malformed() {
    // Given: An error object where the entry array should be
    let body = r#"{"status": {"error_code": 429}}"#;

    // When: The payload is normalized
    let error = normalize_structured(body, &PayloadShape::canonical()).expect_err("wrong shape");

    // Then: The whole payload is rejected
    assert!(matches!(error, NormalizeError::MalformedPayload { .. }));
}

#[test]
fn when_numbers_are_encoded_as_strings_they_are_still_decoded() {
    // Given: A CoinCap-style payload
    let body = r#"{"data": [
        {"rank": "1", "name": "Bitcoin", "symbol": "BTC", "marketCapUsd": "1250000000000.5"},
        {"rank": "2", "name": "Ethereum", "symbol": "ETH", "marketCapUsd": "400000000000"}
    ]}"#;

    // When: The payload is normalized with the CoinCap shape
    let records =
        normalize_structured(body, &PayloadShape::coincap_assets()).expect("string numbers");

    // Then: Ranks and market caps are numeric
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].rank, 1);
    assert_eq!(records[0].market_cap_usd, 1_250_000_000_000.5);
}

// =============================================================================
// Scraped rows
// =============================================================================

#[test]
fn when_a_row_has_fewer_than_three_cells_it_is_skipped_without_aborting() {
    // Given: A short row between two valid rows
    let rows = vec![
        row(&["1", "Bitcoin\nBTC", "$1.50T"]),
        row(&["advertisement", "sponsored"]),
        row(&["2", "Ethereum\nETH", "$400.00B"]),
    ];

    // When: The rows are normalized
    let records = normalize_rows(&rows, ColumnLayout::default());

    // Then: Both valid rows are kept
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].symbol, "ETH");
}

#[test]
fn market_cap_text_expands_magnitude_suffixes() {
    assert_eq!(parse_market_cap("$1.50T"), Some(1.5e12));
    assert_eq!(parse_market_cap("$950.00M"), Some(9.5e8));
    assert_eq!(parse_market_cap("$2,345.00"), Some(2345.0));
    assert_eq!(parse_market_cap("n/a"), None);
    assert_eq!(parse_market_cap("-$5B"), None);
}

#[test]
fn name_and_symbol_split_on_newline_then_last_whitespace() {
    assert_eq!(
        split_name_symbol("Bitcoin\nBTC"),
        (String::from("Bitcoin"), String::from("BTC"))
    );
    assert_eq!(
        split_name_symbol("Tether USDt"),
        (String::from("Tether"), String::from("USDt"))
    );
    assert_eq!(
        split_name_symbol("Bitcoin"),
        (String::from("Bitcoin"), String::new())
    );
}

#[test]
fn when_scraped_ranks_go_backwards_the_later_row_is_rejected() {
    // Given: A duplicated rank in the listing
    let rows = vec![
        row(&["1", "Bitcoin\nBTC", "$1.50T"]),
        row(&["1", "Bitcoin Again\nBTC", "$1.50T"]),
        row(&["2", "Ethereum\nETH", "$400.00B"]),
    ];

    // When: The rows are normalized
    let records = normalize_rows(&rows, ColumnLayout::default());

    // Then: Ranks stay unique and ascending
    let ranks = records.iter().map(|record| record.rank).collect::<Vec<_>>();
    assert_eq!(ranks, vec![1, 2]);
}

// =============================================================================
// Selector priority
// =============================================================================

#[test]
fn when_first_selector_matches_nothing_the_second_selectors_rows_are_used_alone() {
    // Given: A page where selector A finds nothing and selector B finds five rows
    let body_rows = (1..=5)
        .map(|rank| format!("<tr><td>{rank}</td><td>Coin {rank} C{rank}</td><td>${rank}.00B</td></tr>"))
        .collect::<String>();
    let html = format!(
        "<html><body><table id=\"b\"><tbody>{body_rows}</tbody></table>\
         <table class=\"other\"><tbody><tr><td>99</td><td>Noise N</td><td>$1M</td></tr></tbody></table>\
         </body></html>"
    );
    let selectors = parse_selectors(["#a tbody tr", "#b tbody tr", "table tbody tr"])
        .expect("valid selectors");

    // When: Rows are extracted
    let matched = extract_rows(&html, &selectors).expect("rows from B");

    // Then: Exactly B's five rows come back, never merged with later selectors
    assert_eq!(matched.selector, "#b tbody tr");
    assert_eq!(matched.rows.len(), 5);
    let records = normalize_rows(&matched.rows, ColumnLayout::default());
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|record| record.rank <= 5));
}

#[test]
fn when_no_selector_matches_the_error_carries_page_metadata() {
    // Given: A bot-check interstitial with no tables
    let html = "<html><head><title>Attention Required</title></head><body><p>blocked</p></body></html>";
    let selectors = parse_selectors(DEFAULT_ROW_SELECTORS).expect("valid selectors");

    // When: Rows are extracted
    let error = extract_rows(html, &selectors).expect_err("no rows");

    // Then: Title and table count are reported for logging
    assert_eq!(
        error,
        NormalizeError::NoRowsFound {
            selectors_tried: DEFAULT_ROW_SELECTORS.len(),
            title: Some(String::from("Attention Required")),
            table_count: 0,
        }
    );
}
