//! One-shot CoinGecko lookups: spot price, all-time high and price history.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};
use tracing::debug;

use super::{decode_json, fetch_text};
use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Look-back periods reported by the price-change summary, shortest first.
pub const CHANGE_PERIODS: [(&str, i64); 6] = [
    ("1 Day", 1),
    ("7 Days", 7),
    ("1 Month", 30),
    ("3 Months", 90),
    ("6 Months", 180),
    ("1 Year", 365),
];

/// All-time high price and, when known, the day it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllTimeHigh {
    pub price_usd: f64,
    pub reached_on: Option<Date>,
}

/// One sample of the price history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price_usd: f64,
}

/// Percentage change of the current price against one look-back period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodChange {
    pub label: &'static str,
    pub percent: f64,
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    #[serde(default)]
    ath: HashMap<String, f64>,
    #[serde(default)]
    ath_date: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

pub struct CoinGeckoClient {
    base_url: String,
    coin_id: String,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl CoinGeckoClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(COINGECKO_API_BASE),
            coin_id: String::from("bitcoin"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            http_client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Current price in US dollars.
    pub async fn spot_price(&self) -> Result<f64, SourceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            urlencoding::encode(&self.coin_id)
        );
        let body = self.get(url, "coingecko price").await?;
        let prices: HashMap<String, HashMap<String, f64>> = decode_json(&body, "coingecko price")?;

        prices
            .get(&self.coin_id)
            .and_then(|quote| quote.get("usd"))
            .copied()
            .ok_or_else(|| SourceError::malformed_payload("coingecko price response has no usd quote"))
    }

    /// All-time high in US dollars. A missing or unparseable date still
    /// yields the price.
    pub async fn all_time_high(&self) -> Result<AllTimeHigh, SourceError> {
        let url = format!(
            "{}/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false",
            self.base_url,
            urlencoding::encode(&self.coin_id)
        );
        let body = self.get(url, "coingecko coin").await?;
        let detail: CoinDetail = decode_json(&body, "coingecko coin")?;

        let market_data = detail
            .market_data
            .ok_or_else(|| SourceError::malformed_payload("coingecko market data is missing"))?;
        let price_usd = market_data
            .ath
            .get("usd")
            .copied()
            .ok_or_else(|| SourceError::malformed_payload("coingecko ath has no usd value"))?;

        let reached_on = market_data.ath_date.get("usd").and_then(|raw| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .inspect_err(|error| debug!(%error, raw = %raw, "unparseable ath date"))
                .ok()
                .map(OffsetDateTime::date)
        });

        Ok(AllTimeHigh {
            price_usd,
            reached_on,
        })
    }

    /// Daily price samples for the last `days` days, oldest first.
    pub async fn price_history(&self, days: u32) -> Result<Vec<PricePoint>, SourceError> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={days}",
            self.base_url,
            urlencoding::encode(&self.coin_id)
        );
        let body = self.get(url, "coingecko market chart").await?;
        let chart: MarketChart = decode_json(&body, "coingecko market chart")?;

        Ok(chart
            .prices
            .into_iter()
            .map(|(timestamp_ms, price_usd)| PricePoint {
                timestamp_ms: timestamp_ms as i64,
                price_usd,
            })
            .collect())
    }

    async fn get(&self, url: String, label: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        fetch_text(self.http_client.as_ref(), request, label).await
    }
}

/// Percentage change of `current_price` against the first sample at or after
/// each look-back cutoff. Periods without such a sample are omitted.
pub fn changes_since(history: &[PricePoint], now_ms: i64, current_price: f64) -> Vec<PeriodChange> {
    CHANGE_PERIODS
        .iter()
        .filter_map(|(label, days)| {
            let cutoff = now_ms - days * MILLIS_PER_DAY;
            let past = history
                .iter()
                .find(|point| point.timestamp_ms >= cutoff && point.price_usd > 0.0)?;
            Some(PeriodChange {
                label,
                percent: (current_price - past.price_usd) / past.price_usd * 100.0,
            })
        })
        .collect()
}
