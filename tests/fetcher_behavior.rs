//! Behavior-driven tests for the one-shot fetchers
//!
//! These tests verify how price, fee, block height, hashrate and history
//! lookups decode their upstream answers and classify failures.

use satsbot_core::{
    changes_since, CoinGeckoClient, HashrateClient, HashrateUnit, HttpResponse, MempoolClient,
    ScriptedHttpClient, SourceErrorKind,
};
use std::sync::Arc;
use time::macros::date;

const COINGECKO_BASE: &str = "https://coingecko.test/api/v3";
const MEMPOOL_BASE: &str = "https://mempool.test/api";
const HASHRATE_URL: &str = "https://blockchain.test/q/hashrate";

// =============================================================================
// CoinGecko
// =============================================================================

#[tokio::test]
async fn spot_price_reads_the_usd_quote() {
    // Given: A simple-price answer for bitcoin
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{COINGECKO_BASE}/simple/price"),
        HttpResponse::ok(r#"{"bitcoin": {"usd": 67123.45}}"#),
    ));
    let coingecko = CoinGeckoClient::new(client.clone()).with_base_url(COINGECKO_BASE);

    // When: The spot price is requested
    let price = coingecko.spot_price().await.expect("price");

    // Then: The USD quote is returned and the query names the coin
    assert_eq!(price, 67123.45);
    let requests = client.requests();
    assert!(requests[0].url.contains("ids=bitcoin"));
    assert!(requests[0].url.contains("vs_currencies=usd"));
}

#[tokio::test]
async fn spot_price_without_usd_quote_is_malformed() {
    // Given: An answer missing the usd field
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{COINGECKO_BASE}/simple/price"),
        HttpResponse::ok(r#"{"bitcoin": {}}"#),
    ));
    let coingecko = CoinGeckoClient::new(client).with_base_url(COINGECKO_BASE);

    // When: The spot price is requested
    let error = coingecko.spot_price().await.expect_err("no usd");

    // Then: The payload is reported as malformed
    assert_eq!(error.kind(), SourceErrorKind::MalformedPayload);
}

#[tokio::test]
async fn all_time_high_carries_its_date() {
    // Given: Coin detail with ATH price and date
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{COINGECKO_BASE}/coins/bitcoin"),
        HttpResponse::ok(
            r#"{"id": "bitcoin", "market_data": {
                "ath": {"usd": 73738.0, "eur": 67000.0},
                "ath_date": {"usd": "2024-03-14T07:10:36.635Z"}
            }}"#,
        ),
    ));
    let coingecko = CoinGeckoClient::new(client).with_base_url(COINGECKO_BASE);

    // When: The all-time high is requested
    let ath = coingecko.all_time_high().await.expect("ath");

    // Then: Price and day are both present
    assert_eq!(ath.price_usd, 73738.0);
    assert_eq!(ath.reached_on, Some(date!(2024 - 03 - 14)));
}

#[tokio::test]
async fn all_time_high_survives_an_unparseable_date() {
    // Given: Coin detail with a garbled ATH date
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{COINGECKO_BASE}/coins/bitcoin"),
        HttpResponse::ok(
            r#"{"market_data": {"ath": {"usd": 69045.0}, "ath_date": {"usd": "last tuesday"}}}"#,
        ),
    ));
    let coingecko = CoinGeckoClient::new(client).with_base_url(COINGECKO_BASE);

    // When: The all-time high is requested
    let ath = coingecko.all_time_high().await.expect("ath");

    // Then: The price is still reported
    assert_eq!(ath.price_usd, 69045.0);
    assert_eq!(ath.reached_on, None);
}

#[tokio::test]
async fn price_history_feeds_period_changes() {
    // Given: A market chart with one sample a year ago and one a day ago
    let now_ms: i64 = 1_710_000_000_000;
    let day_ms: i64 = 86_400_000;
    let body = format!(
        r#"{{"prices": [[{}, 30000.0], [{}, 60000.0]], "market_caps": [], "total_volumes": []}}"#,
        now_ms - 365 * day_ms,
        now_ms - day_ms
    );
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{COINGECKO_BASE}/coins/bitcoin/market_chart"),
        HttpResponse::ok(body),
    ));
    let coingecko = CoinGeckoClient::new(client).with_base_url(COINGECKO_BASE);

    // When: History is fetched and compared against the current price
    let history = coingecko.price_history(365).await.expect("history");
    let changes = changes_since(&history, now_ms, 66000.0);

    // Then: The yearly change uses the oldest sample, shorter periods the latest
    assert_eq!(history.len(), 2);
    let year = changes
        .iter()
        .find(|change| change.label == "1 Year")
        .expect("year change");
    assert!((year.percent - 120.0).abs() < 1e-9);
    let day = changes
        .iter()
        .find(|change| change.label == "1 Day")
        .expect("day change");
    assert!((day.percent - 10.0).abs() < 1e-9);
}

// =============================================================================
// mempool.space
// =============================================================================

#[tokio::test]
async fn tip_height_is_parsed_from_plain_text() {
    // Given: The tip endpoint answering with a bare integer
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{MEMPOOL_BASE}/blocks/tip/height"),
        HttpResponse::ok("842137\n"),
    ));
    let mempool = MempoolClient::new(client).with_base_url(MEMPOOL_BASE);

    // When: The height is requested
    let height = mempool.tip_height().await.expect("height");

    // Then: Surrounding whitespace is ignored
    assert_eq!(height, 842_137);
}

#[tokio::test]
async fn recommended_fees_convert_to_usd() {
    // Given: Recommended fee rates
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{MEMPOOL_BASE}/v1/fees/recommended"),
        HttpResponse::ok(
            r#"{"fastestFee": 20, "halfHourFee": 10, "hourFee": 5, "economyFee": 2, "minimumFee": 1}"#,
        ),
    ));
    let mempool = MempoolClient::new(client).with_base_url(MEMPOOL_BASE);

    // When: Fees are fetched and priced at $80,000
    let fees = mempool.recommended_fees().await.expect("fees").to_usd(80_000.0);

    // Then: A 250 vB transaction costs sat_per_vb * 0.2 dollars
    assert!((fees.low - 1.0).abs() < 1e-9);
    assert!((fees.medium - 2.0).abs() < 1e-9);
    assert!((fees.high - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn mempool_outage_is_a_bad_status() {
    // Given: mempool.space answering 502
    let client = Arc::new(ScriptedHttpClient::new().respond(
        format!("{MEMPOOL_BASE}/blocks/tip/height"),
        HttpResponse::new(502, "Bad Gateway"),
    ));
    let mempool = MempoolClient::new(client).with_base_url(MEMPOOL_BASE);

    // When: The height is requested
    let error = mempool.tip_height().await.expect_err("outage");

    // Then: The status is kept on the error
    assert_eq!(error.kind(), SourceErrorKind::BadStatus);
    assert_eq!(error.status(), Some(502));
}

// =============================================================================
// Hashrate
// =============================================================================

#[tokio::test]
async fn hashrate_in_hashes_per_second_is_reported_in_exahashes() {
    // Given: An endpoint reporting H/s
    let client = Arc::new(
        ScriptedHttpClient::new().respond(HASHRATE_URL, HttpResponse::ok("650000000000000000000")),
    );
    let hashrate = HashrateClient::new(client).with_url(HASHRATE_URL);

    // When: The hashrate is requested
    let value = hashrate.exahashes_per_second().await.expect("hashrate");

    // Then: The value is converted to EH/s
    assert!((value - 650.0).abs() < 1e-9);
}

#[tokio::test]
async fn hashrate_unit_is_configured_per_source() {
    // Given: An endpoint reporting GH/s
    let client = Arc::new(
        ScriptedHttpClient::new().respond(HASHRATE_URL, HttpResponse::ok("650000000000")),
    );
    let hashrate = HashrateClient::new(client)
        .with_url(HASHRATE_URL)
        .with_unit(HashrateUnit::Gh);

    // When: The hashrate is requested
    let value = hashrate.exahashes_per_second().await.expect("hashrate");

    // Then: The same network rate comes out
    assert!((value - 650.0).abs() < 1e-9);
}
