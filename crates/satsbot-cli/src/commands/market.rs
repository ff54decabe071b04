use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;

use satsbot_core::{
    changes_since, render_top_assets, ChainFailure, CoinGeckoClient, HashrateClient, HttpClient,
    MempoolClient, SourceChain, SourceChainBuilder, SourceError,
};

use super::{messages, Command};
use crate::config::BotConfig;
use crate::error::CliError;

/// Days of price history fetched for `/change`.
const HISTORY_DAYS: u32 = 365;

/// Why a command could not produce its reply. Only logged, never shown.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Chain(#[from] ChainFailure),

    #[error("{0}")]
    Missing(&'static str),
}

/// Every upstream the commands read from.
pub struct MarketServices {
    coingecko: CoinGeckoClient,
    mempool: MempoolClient,
    hashrate: HashrateClient,
    chain: SourceChain,
}

impl MarketServices {
    pub fn new(
        coingecko: CoinGeckoClient,
        mempool: MempoolClient,
        hashrate: HashrateClient,
        chain: SourceChain,
    ) -> Self {
        Self {
            coingecko,
            mempool,
            hashrate,
            chain,
        }
    }

    pub fn from_config(
        config: &BotConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, CliError> {
        let timeout_ms = config.http_timeout_ms;

        let mut chain = SourceChainBuilder::new(Arc::clone(&http_client))
            .with_timeout_ms(timeout_ms)
            .with_primary_url(&config.primary_api_url)
            .with_listing_url(&config.listing_url);
        if let Some(url) = &config.secondary_api_url {
            chain = chain.with_secondary_url(url);
        }

        Ok(Self::new(
            CoinGeckoClient::new(Arc::clone(&http_client)).with_timeout_ms(timeout_ms),
            MempoolClient::new(Arc::clone(&http_client)).with_timeout_ms(timeout_ms),
            HashrateClient::new(http_client)
                .with_url(&config.hashrate_url)
                .with_unit(config.hashrate_unit)
                .with_timeout_ms(timeout_ms),
            chain.build()?,
        ))
    }

    pub fn chain(&self) -> &SourceChain {
        &self.chain
    }

    pub async fn reply(&self, command: Command) -> Result<String, ReplyError> {
        match command {
            Command::Btc => Ok(messages::price(self.coingecko.spot_price().await?)),
            Command::Block => Ok(messages::block(self.mempool.tip_height().await?)),
            Command::Fees => {
                let fees = self.mempool.recommended_fees().await?;
                let price = self.coingecko.spot_price().await?;
                Ok(messages::fees(fees.to_usd(price)))
            }
            Command::MarketCap => {
                let success = self.chain.fetch_top_assets().await?;
                let bitcoin = success
                    .records
                    .iter()
                    .find(|record| record.symbol.eq_ignore_ascii_case("BTC"))
                    .ok_or(ReplyError::Missing("no BTC record in the ranking"))?;
                Ok(messages::market_cap(bitcoin.market_cap_usd))
            }
            Command::Hashrate => Ok(messages::hashrate(
                self.hashrate.exahashes_per_second().await?,
            )),
            Command::Change => {
                let price = self.coingecko.spot_price().await?;
                let history = self.coingecko.price_history(HISTORY_DAYS).await?;
                let changes = changes_since(&history, now_ms(), price);
                if changes.is_empty() {
                    return Err(ReplyError::Missing("price history has no usable samples"));
                }
                Ok(messages::changes(&changes))
            }
            Command::Ath => Ok(messages::all_time_high(
                self.coingecko.all_time_high().await?,
            )),
            Command::Top => {
                let success = self.chain.fetch_top_assets().await?;
                Ok(render_top_assets(&success.records))
            }
            Command::Help => Ok(String::from(messages::HELP)),
        }
    }
}

fn now_ms() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}
