use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{ApiSource, ListingPageSource, COINGECKO_MARKETS_URL, LISTING_PAGE_URL};
use crate::data_source::{AssetSource, SourceDescriptor, SourceError};
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::normalize::{ColumnLayout, DEFAULT_ROW_SELECTORS};
use crate::{AssetRecord, SourceAttempt, ValidationError};

/// One stage that did not produce records.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    pub attempt: SourceAttempt,
    pub error: SourceError,
}

/// Records from the first stage that produced any.
#[derive(Debug, Clone)]
pub struct ChainSuccess {
    pub records: Vec<AssetRecord>,
    pub attempt: SourceAttempt,
    pub failures: Vec<FailedAttempt>,
    pub latency_ms: u64,
}

/// Every stage failed. Carries one entry per stage, in attempt order.
#[derive(Debug, Clone, Error)]
#[error("all {} market data sources failed", .failures.len())]
pub struct ChainFailure {
    pub failures: Vec<FailedAttempt>,
    pub latency_ms: u64,
}

pub type ChainResult = Result<ChainSuccess, ChainFailure>;

/// Ordered fallback over market-cap sources.
///
/// Stages run strictly one after another, each exactly once. A stage that
/// errors or yields no records hands over to the next one.
pub struct SourceChain {
    sources: Vec<Arc<dyn AssetSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Arc<dyn AssetSource>>) -> Self {
        Self { sources }
    }

    pub fn descriptors(&self) -> Vec<SourceDescriptor> {
        self.sources.iter().map(|source| source.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub async fn fetch_top_assets(&self) -> ChainResult {
        let started = Instant::now();
        let mut failures = Vec::new();

        for source in &self.sources {
            let outcome = source.fetch().await.and_then(|yielded| {
                if yielded.records.is_empty() {
                    Err(SourceError::no_rows_found(format!(
                        "{} produced no records",
                        yielded.attempt
                    )))
                } else {
                    Ok(yielded)
                }
            });

            match outcome {
                Ok(yielded) => {
                    info!(
                        source = %yielded.attempt,
                        records = yielded.records.len(),
                        failed_before = failures.len(),
                        "market data source selected"
                    );
                    return Ok(ChainSuccess {
                        records: yielded.records,
                        attempt: yielded.attempt,
                        failures,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    let attempt = SourceAttempt::new(source.id());
                    warn!(
                        source = %attempt,
                        code = error.code(),
                        status = ?error.status(),
                        message = error.message(),
                        "market data source failed, falling back"
                    );
                    failures.push(FailedAttempt { attempt, error });
                }
            }
        }

        let failure = ChainFailure {
            failures,
            latency_ms: elapsed_ms(started),
        };
        warn!(attempts = failure.failures.len(), "all market data sources exhausted");
        Err(failure)
    }
}

/// Builds the standard chain: primary API, optional secondary API, then the
/// listing-page scrape.
pub struct SourceChainBuilder {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    primary_url: String,
    secondary_url: Option<String>,
    listing_url: String,
    selectors: Vec<String>,
    layout: ColumnLayout,
}

impl SourceChainBuilder {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            primary_url: String::from(COINGECKO_MARKETS_URL),
            secondary_url: None,
            listing_url: String::from(LISTING_PAGE_URL),
            selectors: DEFAULT_ROW_SELECTORS.iter().map(|s| (*s).to_owned()).collect(),
            layout: ColumnLayout::default(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_primary_url(mut self, url: impl Into<String>) -> Self {
        self.primary_url = url.into();
        self
    }

    /// Enables the secondary API stage.
    pub fn with_secondary_url(mut self, url: impl Into<String>) -> Self {
        self.secondary_url = Some(url.into());
        self
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn build(self) -> Result<SourceChain, ValidationError> {
        let mut sources: Vec<Arc<dyn AssetSource>> = Vec::with_capacity(3);

        sources.push(Arc::new(
            ApiSource::coingecko(Arc::clone(&self.http_client))
                .with_url(self.primary_url)
                .with_timeout_ms(self.timeout_ms),
        ));

        if let Some(url) = self.secondary_url {
            sources.push(Arc::new(
                ApiSource::coincap(Arc::clone(&self.http_client))
                    .with_url(url)
                    .with_timeout_ms(self.timeout_ms),
            ));
        }

        sources.push(Arc::new(
            ListingPageSource::new(self.http_client)?
                .with_url(self.listing_url)
                .with_selectors(self.selectors)?
                .with_layout(self.layout)
                .with_timeout_ms(self.timeout_ms),
        ));

        Ok(SourceChain::new(sources))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
