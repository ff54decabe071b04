pub mod api;
pub mod coingecko;
pub mod hashrate;
pub mod listing;
pub mod mempool;

pub use api::{ApiSource, COINCAP_ASSETS_URL, COINGECKO_MARKETS_URL};
pub use coingecko::{
    changes_since, AllTimeHigh, CoinGeckoClient, PeriodChange, PricePoint, CHANGE_PERIODS,
    COINGECKO_API_BASE,
};
pub use hashrate::{HashrateClient, BLOCKCHAIN_INFO_HASHRATE_URL};
pub use listing::{ListingPageSource, LISTING_PAGE_URL};
pub use mempool::{FeesUsd, MempoolClient, RecommendedFees, MEMPOOL_API_BASE};

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest};

/// Executes one request and returns the body of a 2xx response.
pub(crate) async fn fetch_text(
    http_client: &dyn HttpClient,
    request: HttpRequest,
    label: &str,
) -> Result<String, SourceError> {
    let response = http_client
        .execute(request)
        .await
        .map_err(|error| {
            let error = SourceError::from(error);
            SourceError::transport(format!("{label}: {}", error.message()))
        })?;

    if !response.is_success() {
        return Err(SourceError::bad_status(
            response.status,
            format!("{label} returned status {}", response.status),
        ));
    }

    Ok(response.body)
}

/// Decodes a JSON body, classifying failures as malformed payloads.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    body: &str,
    label: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body)
        .map_err(|e| SourceError::malformed_payload(format!("failed to parse {label} response: {e}")))
}
