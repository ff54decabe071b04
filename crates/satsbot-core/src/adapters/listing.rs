use std::sync::Arc;

use tracing::{debug, warn};

use super::fetch_text;
use crate::data_source::{AssetSource, SourceDescriptor, SourceError, SourceFuture, SourceYield};
use crate::error::{NormalizeError, ValidationError};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::normalize::{
    extract_rows, normalize_rows, parse_selectors, ColumnLayout, RowSelector, DEFAULT_ROW_SELECTORS,
};
use crate::{SourceAttempt, SourceId};

/// Public ranking page scraped when the structured APIs fail.
pub const LISTING_PAGE_URL: &str =
    "https://companiesmarketcap.com/cryptocurrency/largest-cryptocurrencies-by-market-cap/";

/// Scrape stage: fetches the listing page and reads its ranking table.
pub struct ListingPageSource {
    url: String,
    selectors: Vec<RowSelector>,
    layout: ColumnLayout,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl ListingPageSource {
    /// Listing page with the built-in selector list.
    pub fn new(http_client: Arc<dyn HttpClient>) -> Result<Self, ValidationError> {
        Ok(Self {
            url: String::from(LISTING_PAGE_URL),
            selectors: parse_selectors(DEFAULT_ROW_SELECTORS)?,
            layout: ColumnLayout::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            http_client,
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replaces the selector list; order is priority.
    pub fn with_selectors<I, S>(mut self, selectors: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = parse_selectors(selectors)?;
        Ok(self)
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn scrape(&self, html: &str) -> Result<SourceYield, SourceError> {
        let matched = extract_rows(html, &self.selectors).inspect_err(|error| {
            if let NormalizeError::NoRowsFound {
                selectors_tried,
                title,
                table_count,
            } = error
            {
                warn!(
                    url = %self.url,
                    selectors_tried,
                    title = title.as_deref().unwrap_or("<none>"),
                    table_count,
                    "listing page has no rows under any known selector"
                );
            }
        })?;

        let row_count = matched.rows.len();
        let cell_counts = matched.rows.iter().map(Vec::len).collect::<Vec<_>>();
        let records = normalize_rows(&matched.rows, self.layout);
        debug!(
            selector = %matched.selector,
            rows = row_count,
            ?cell_counts,
            records = records.len(),
            "listing rows normalized"
        );

        if records.is_empty() {
            return Err(NormalizeError::NoValidRows {
                selector: matched.selector,
                rows: row_count,
            }
            .into());
        }

        Ok(SourceYield {
            records,
            attempt: SourceAttempt::scrape(matched.selector),
        })
    }
}

impl AssetSource for ListingPageSource {
    fn id(&self) -> SourceId {
        SourceId::Scrape
    }

    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            id: SourceId::Scrape,
            url: self.url.clone(),
            selectors: self
                .selectors
                .iter()
                .map(|selector| selector.as_str().to_owned())
                .collect(),
        }
    }

    fn fetch<'a>(&'a self) -> SourceFuture<'a> {
        Box::pin(async move {
            let request = HttpRequest::get(&self.url)
                .with_header("accept", "text/html")
                .with_timeout_ms(self.timeout_ms);

            let html = fetch_text(self.http_client.as_ref(), request, "listing page").await?;
            self.scrape(&html)
        })
    }
}
