use std::sync::Arc;

use tracing::debug;

use super::fetch_text;
use crate::data_source::SourceError;
use crate::domain::HashrateUnit;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

/// Plain-text network hashrate.
pub const BLOCKCHAIN_INFO_HASHRATE_URL: &str = "https://blockchain.info/q/hashrate";

/// Network hashrate lookup. The unit the endpoint reports in is configured
/// per source; results are always returned in EH/s.
pub struct HashrateClient {
    url: String,
    unit: HashrateUnit,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl HashrateClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: String::from(BLOCKCHAIN_INFO_HASHRATE_URL),
            unit: HashrateUnit::H,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            http_client,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_unit(mut self, unit: HashrateUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub const fn unit(&self) -> HashrateUnit {
        self.unit
    }

    pub async fn exahashes_per_second(&self) -> Result<f64, SourceError> {
        let request = HttpRequest::get(&self.url).with_timeout_ms(self.timeout_ms);
        let body = fetch_text(self.http_client.as_ref(), request, "hashrate").await?;
        let raw = parse_plain_number(&body)?;
        debug!(raw, unit = %self.unit, "hashrate fetched");

        Ok(self.unit.convert(raw, HashrateUnit::Eh))
    }
}

fn parse_plain_number(body: &str) -> Result<f64, SourceError> {
    let trimmed = body.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(SourceError::malformed_payload(format!(
            "hashrate response is not a number: {trimmed:?}"
        ))),
    }
}
