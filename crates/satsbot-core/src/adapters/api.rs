use std::sync::Arc;

use tracing::debug;

use super::fetch_text;
use crate::data_source::{AssetSource, SourceDescriptor, SourceFuture, SourceYield};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::normalize::{normalize_structured, PayloadShape};
use crate::{SourceAttempt, SourceId};

/// CoinGecko top-ten markets by capitalization.
pub const COINGECKO_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10&page=1";

/// CoinCap top-ten assets.
pub const COINCAP_ASSETS_URL: &str = "https://api.coincap.io/v2/assets?limit=10";

/// A structured JSON endpoint described by its URL and payload shape.
pub struct ApiSource {
    id: SourceId,
    url: String,
    shape: PayloadShape,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl ApiSource {
    pub fn new(
        id: SourceId,
        url: impl Into<String>,
        shape: PayloadShape,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            shape,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            http_client,
        }
    }

    /// Primary stage: CoinGecko markets.
    pub fn coingecko(http_client: Arc<dyn HttpClient>) -> Self {
        Self::new(
            SourceId::PrimaryApi,
            COINGECKO_MARKETS_URL,
            PayloadShape::coingecko_markets(),
            http_client,
        )
    }

    /// Optional secondary stage: CoinCap assets.
    pub fn coincap(http_client: Arc<dyn HttpClient>) -> Self {
        Self::new(
            SourceId::SecondaryApi,
            COINCAP_ASSETS_URL,
            PayloadShape::coincap_assets(),
            http_client,
        )
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl AssetSource for ApiSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            id: self.id,
            url: self.url.clone(),
            selectors: Vec::new(),
        }
    }

    fn fetch<'a>(&'a self) -> SourceFuture<'a> {
        Box::pin(async move {
            let request = HttpRequest::get(&self.url)
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);

            let body = fetch_text(self.http_client.as_ref(), request, self.id.as_str()).await?;
            let records = normalize_structured(&body, &self.shape)?;
            debug!(source = %self.id, records = records.len(), "structured payload normalized");

            Ok(SourceYield {
                records,
                attempt: SourceAttempt::new(self.id),
            })
        })
    }
}
