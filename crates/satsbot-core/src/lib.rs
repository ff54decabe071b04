//! Core market-data retrieval for satsbot.
//!
//! This crate contains:
//! - Ranked asset records and the collector that enforces their invariants
//! - The record normalizer for structured JSON and scraped listing pages
//! - Source adapters and the ordered fallback chain
//! - One-shot fetchers for price, fees, block height, hashrate and history
//! - Chat rendering of ranked assets
//!
//! | Stage | Source | Payload |
//! |-------|--------|---------|
//! | `primary-api` | CoinGecko `/coins/markets` | JSON array |
//! | `secondary-api` | CoinCap `/v2/assets` (opt-in) | JSON `{"data": [...]}` |
//! | `scrape:<selector>` | companiesmarketcap listing page | HTML table rows |

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod render;
pub mod routing;
pub mod source;

pub use adapters::{
    changes_since, AllTimeHigh, ApiSource, CoinGeckoClient, FeesUsd, HashrateClient,
    ListingPageSource, MempoolClient, PeriodChange, PricePoint, RecommendedFees,
};
pub use data_source::{AssetSource, SourceDescriptor, SourceError, SourceErrorKind, SourceYield};
pub use domain::{AssetRecord, HashrateUnit, RecordSet, MAX_RECORDS};
pub use error::{NormalizeError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient, DEFAULT_TIMEOUT_MS,
};
pub use render::{abbreviate_usd, render_top_assets};
pub use routing::{
    ChainFailure, ChainResult, ChainSuccess, FailedAttempt, SourceChain, SourceChainBuilder,
};
pub use source::{SourceAttempt, SourceId};
