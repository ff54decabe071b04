use std::sync::Arc;

use serde::Deserialize;

use super::{decode_json, fetch_text};
use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

pub const MEMPOOL_API_BASE: &str = "https://mempool.space/api";

/// Virtual size of the reference transaction used for fee quotes.
pub const REFERENCE_TX_VBYTES: f64 = 250.0;

const SATS_PER_BTC: f64 = 100_000_000.0;

/// Fee rates in sat/vB as published by mempool.space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFees {
    pub fastest_fee: f64,
    pub half_hour_fee: f64,
    pub hour_fee: f64,
}

impl RecommendedFees {
    /// Prices a reference transaction at each fee rate.
    pub fn to_usd(self, btc_price_usd: f64) -> FeesUsd {
        let quote = |sat_per_vb: f64| sat_per_vb * REFERENCE_TX_VBYTES * btc_price_usd / SATS_PER_BTC;
        FeesUsd {
            low: quote(self.hour_fee),
            medium: quote(self.half_hour_fee),
            high: quote(self.fastest_fee),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeesUsd {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

pub struct MempoolClient {
    base_url: String,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl MempoolClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(MEMPOOL_API_BASE),
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

    /// Height of the current chain tip. The endpoint answers with a bare
    /// integer in plain text.
    pub async fn tip_height(&self) -> Result<u64, SourceError> {
        let body = self.get("/blocks/tip/height", "mempool tip height").await?;
        body.trim().parse::<u64>().map_err(|e| {
            SourceError::malformed_payload(format!("mempool tip height is not an integer: {e}"))
        })
    }

    pub async fn recommended_fees(&self) -> Result<RecommendedFees, SourceError> {
        let body = self.get("/v1/fees/recommended", "mempool fees").await?;
        decode_json(&body, "mempool fees")
    }

    async fn get(&self, path: &str, label: &str) -> Result<String, SourceError> {
        let request = HttpRequest::get(format!("{}{path}", self.base_url))
            .with_timeout_ms(self.timeout_ms);
        fetch_text(self.http_client.as_ref(), request, label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fees_are_priced_for_a_250_vbyte_transaction() {
        let fees = RecommendedFees {
            fastest_fee: 40.0,
            half_hour_fee: 20.0,
            hour_fee: 10.0,
        };

        let usd = fees.to_usd(40_000.0);

        // 10 sat/vB * 250 vB = 2500 sats = 0.000025 BTC
        assert!((usd.low - 1.0).abs() < 1e-9);
        assert!((usd.medium - 2.0).abs() < 1e-9);
        assert!((usd.high - 4.0).abs() < 1e-9);
    }

    #[test]
    fn fee_payload_uses_camel_case_fields() {
        let fees: RecommendedFees = serde_json::from_str(
            r#"{"fastestFee":12,"halfHourFee":8,"hourFee":5,"economyFee":3,"minimumFee":1}"#,
        )
        .expect("fees payload");

        assert_eq!(fees.hour_fee, 5.0);
        assert_eq!(fees.fastest_fee, 12.0);
    }
}
