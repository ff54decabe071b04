//! Environment configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BOT_TOKEN` | required by `run` |
//! | `SATSBOT_TELEGRAM_API` | `https://api.telegram.org` |
//! | `SATSBOT_HTTP_TIMEOUT_MS` | `8000` |
//! | `SATSBOT_POLL_TIMEOUT_SECS` | `60` |
//! | `SATSBOT_PRIMARY_API_URL` | CoinGecko `/coins/markets` |
//! | `SATSBOT_SECONDARY_API_URL` | unset (stage disabled) |
//! | `SATSBOT_LISTING_URL` | companiesmarketcap listing page |
//! | `SATSBOT_HASHRATE_URL` | blockchain.info `/q/hashrate` |
//! | `SATSBOT_HASHRATE_UNIT` | `h` |

use std::env;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use satsbot_core::adapters::{
    BLOCKCHAIN_INFO_HASHRATE_URL, COINGECKO_MARKETS_URL, LISTING_PAGE_URL,
};
use satsbot_core::{HashrateUnit, DEFAULT_TIMEOUT_MS};

use crate::error::CliError;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: Option<String>,
    pub telegram_api: String,
    pub http_timeout_ms: u64,
    pub poll_timeout_secs: u64,
    pub primary_api_url: String,
    pub secondary_api_url: Option<String>,
    pub listing_url: String,
    pub hashrate_url: String,
    pub hashrate_unit: HashrateUnit,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            bot_token: var("BOT_TOKEN"),
            telegram_api: var("SATSBOT_TELEGRAM_API")
                .unwrap_or_else(|| String::from(DEFAULT_TELEGRAM_API)),
            http_timeout_ms: parse_var(
                "SATSBOT_HTTP_TIMEOUT_MS",
                var("SATSBOT_HTTP_TIMEOUT_MS"),
                DEFAULT_TIMEOUT_MS,
            )?,
            poll_timeout_secs: parse_var(
                "SATSBOT_POLL_TIMEOUT_SECS",
                var("SATSBOT_POLL_TIMEOUT_SECS"),
                DEFAULT_POLL_TIMEOUT_SECS,
            )?,
            primary_api_url: var("SATSBOT_PRIMARY_API_URL")
                .unwrap_or_else(|| String::from(COINGECKO_MARKETS_URL)),
            secondary_api_url: var("SATSBOT_SECONDARY_API_URL"),
            listing_url: var("SATSBOT_LISTING_URL")
                .unwrap_or_else(|| String::from(LISTING_PAGE_URL)),
            hashrate_url: var("SATSBOT_HASHRATE_URL")
                .unwrap_or_else(|| String::from(BLOCKCHAIN_INFO_HASHRATE_URL)),
            hashrate_unit: match var("SATSBOT_HASHRATE_UNIT") {
                Some(value) => HashrateUnit::from_str(&value)?,
                None => HashrateUnit::H,
            },
        })
    }

    pub fn with_timeout_override(mut self, timeout_ms: Option<u64>) -> Self {
        if let Some(timeout_ms) = timeout_ms {
            self.http_timeout_ms = timeout_ms;
        }
        self
    }

    pub fn require_token(&self) -> Result<&str, CliError> {
        self.bot_token.as_deref().ok_or(CliError::MissingToken)
    }
}

impl Debug for BotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("telegram_api", &self.telegram_api)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("primary_api_url", &self.primary_api_url)
            .field("secondary_api_url", &self.secondary_api_url)
            .field("listing_url", &self.listing_url)
            .field("hashrate_url", &self.hashrate_url)
            .field("hashrate_unit", &self.hashrate_unit)
            .finish()
    }
}

fn parse_var(name: &'static str, value: Option<String>, default: u64) -> Result<u64, CliError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        Ok(_) => Err(CliError::Config {
            name,
            reason: String::from("must be greater than zero"),
        }),
        Err(error) => Err(CliError::Config {
            name,
            reason: error.to_string(),
        }),
    }
}
