mod market;
mod messages;
mod sources;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use satsbot_core::ReqwestHttpClient;

use crate::cli::{Cli, Command as CliCommand};
use crate::config::BotConfig;
use crate::error::CliError;
use crate::sink::{MessageSink, StdoutSink, TelegramSink};
use crate::telegram::{TelegramApi, TelegramPoller};

pub use market::MarketServices;

/// Chat commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Btc,
    Block,
    Fees,
    MarketCap,
    Hashrate,
    Change,
    Ath,
    Top,
    Help,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("message is not a command")]
    NotACommand,
    #[error("unknown command '/{0}'")]
    Unknown(String),
}

impl Command {
    /// Parses the leading `/command` of a chat message. A `@botname` suffix
    /// and any trailing arguments are ignored.
    pub fn parse(text: &str) -> Result<Self, CommandParseError> {
        let word = text
            .split_whitespace()
            .next()
            .and_then(|word| word.strip_prefix('/'))
            .ok_or(CommandParseError::NotACommand)?;
        let name = word.split('@').next().unwrap_or(word).to_ascii_lowercase();

        match name.as_str() {
            "btc" => Ok(Self::Btc),
            "block" => Ok(Self::Block),
            "fees" => Ok(Self::Fees),
            "marketcap" => Ok(Self::MarketCap),
            "hashrate" => Ok(Self::Hashrate),
            "change" => Ok(Self::Change),
            "ath" => Ok(Self::Ath),
            "top" => Ok(Self::Top),
            "help" | "start" => Ok(Self::Help),
            "" => Err(CommandParseError::NotACommand),
            _ => Err(CommandParseError::Unknown(name)),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Btc => "btc",
            Self::Block => "block",
            Self::Fees => "fees",
            Self::MarketCap => "marketcap",
            Self::Hashrate => "hashrate",
            Self::Change => "change",
            Self::Ath => "ath",
            Self::Top => "top",
            Self::Help => "help",
        }
    }

    /// Generic apology sent when the reply could not be produced.
    pub const fn failure_text(self) -> &'static str {
        match self {
            Self::Btc => "Sorry, I couldn't fetch the BTC price right now.",
            Self::Block => "Sorry, I couldn't fetch the BTC block number right now.",
            Self::Fees => "Sorry, I couldn't fetch the BTC transaction fees right now.",
            Self::MarketCap => "Sorry, I couldn't fetch the BTC market cap right now.",
            Self::Hashrate => "Sorry, I couldn't fetch the BTC hashrate right now.",
            Self::Change => "Sorry, I couldn't fetch the BTC price changes right now.",
            Self::Ath => "Sorry, I couldn't fetch the BTC all-time high right now.",
            Self::Top => "Sorry, I couldn't fetch the top assets by market cap right now.",
            Self::Help => "Sorry, something went wrong.",
        }
    }
}

/// Answers commands through an explicitly passed sink.
pub struct Dispatcher {
    services: MarketServices,
    sink: Arc<dyn MessageSink>,
}

impl Dispatcher {
    pub fn new(services: MarketServices, sink: Arc<dyn MessageSink>) -> Self {
        Self { services, sink }
    }

    /// Sends exactly one message for `command`: the reply, or the command's
    /// apology when any upstream failed.
    pub async fn handle(&self, chat_id: i64, command: Command) {
        info!(command = command.as_str(), chat_id, "command received");

        let text = match self.services.reply(command).await {
            Ok(text) => text,
            Err(error) => {
                warn!(command = command.as_str(), %error, "command failed");
                String::from(command.failure_text())
            }
        };

        if let Err(error) = self.sink.send_message(chat_id, &text).await {
            warn!(command = command.as_str(), chat_id, %error, "failed to send reply");
        }
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = BotConfig::from_env()?.with_timeout_override(cli.timeout_ms);
    let http_client = Arc::new(ReqwestHttpClient::new());
    let services = MarketServices::from_config(&config, http_client.clone())?;

    match &cli.command {
        CliCommand::Run => {
            let token = config.require_token()?;
            let api = Arc::new(TelegramApi::new(
                &config.telegram_api,
                token,
                config.http_timeout_ms,
                http_client,
            ));
            let dispatcher = Arc::new(Dispatcher::new(
                services,
                Arc::new(TelegramSink::new(Arc::clone(&api))),
            ));

            let shutdown = async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(%error, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            };
            TelegramPoller::new(api, config.poll_timeout_secs)
                .run(dispatcher, shutdown)
                .await;
            Ok(())
        }
        CliCommand::Ask(args) => {
            let command = Command::parse(&args.command)
                .map_err(|error| CliError::Command(error.to_string()))?;
            Dispatcher::new(services, Arc::new(StdoutSink))
                .handle(0, command)
                .await;
            Ok(())
        }
        CliCommand::Sources(args) => sources::run(services.chain(), args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sink::SinkFuture;
    use satsbot_core::{
        CoinGeckoClient, HashrateClient, HttpResponse, MempoolClient, ScriptedHttpClient,
        SourceChainBuilder,
    };
    use std::sync::Mutex;

    const PRIMARY_URL: &str = "https://primary.test/coins/markets";
    const LISTING_URL: &str = "https://listing.test/top/";
    const COINGECKO_BASE: &str = "https://coingecko.test/api/v3";

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(i64, String)>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().expect("sink lock").clone()
        }
    }

    impl MessageSink for RecordingSink {
        fn send_message<'a>(&'a self, chat_id: i64, text: &'a str) -> SinkFuture<'a> {
            Box::pin(async move {
                self.sent
                    .lock()
                    .expect("sink lock")
                    .push((chat_id, text.to_owned()));
                Ok::<(), SinkError>(())
            })
        }
    }

    fn services(client: Arc<ScriptedHttpClient>) -> MarketServices {
        MarketServices::new(
            CoinGeckoClient::new(client.clone()).with_base_url(COINGECKO_BASE),
            MempoolClient::new(client.clone()).with_base_url("https://mempool.test/api"),
            HashrateClient::new(client.clone()).with_url("https://blockchain.test/q/hashrate"),
            SourceChainBuilder::new(client)
                .with_primary_url(PRIMARY_URL)
                .with_listing_url(LISTING_URL)
                .build()
                .expect("valid chain"),
        )
    }

    #[test]
    fn parse_accepts_bot_suffix_and_arguments() {
        assert_eq!(Command::parse("/btc"), Ok(Command::Btc));
        assert_eq!(Command::parse("/top@satsbot"), Ok(Command::Top));
        assert_eq!(Command::parse("  /MarketCap please"), Ok(Command::MarketCap));
        assert_eq!(Command::parse("/start"), Ok(Command::Help));
    }

    #[test]
    fn parse_separates_plain_text_from_unknown_commands() {
        assert_eq!(Command::parse("hello"), Err(CommandParseError::NotACommand));
        assert_eq!(Command::parse("/"), Err(CommandParseError::NotACommand));
        assert_eq!(
            Command::parse("/moon@satsbot"),
            Err(CommandParseError::Unknown(String::from("moon")))
        );
    }

    #[tokio::test]
    async fn when_all_sources_fail_the_chat_receives_exactly_one_apology() {
        // Given: Every upstream is unreachable
        let client = Arc::new(ScriptedHttpClient::new());
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(services(client), sink.clone());

        // When: /top is handled
        dispatcher.handle(77, Command::Top).await;

        // Then: One generic failure message, no raw error text
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 77);
        assert_eq!(sent[0].1, Command::Top.failure_text());
    }

    #[tokio::test]
    async fn top_renders_the_scraped_ranking_after_primary_failure() {
        // Given: A rate-limited primary API and a two-row listing page
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond(PRIMARY_URL, HttpResponse::new(429, "slow down"))
                .respond(
                    LISTING_URL,
                    HttpResponse::ok(
                        "<table><tbody>\
                         <tr><td>1</td><td>Bitcoin\nBTC</td><td>$1.50T</td></tr>\
                         <tr><td>2</td><td>Ethereum ETH</td><td>$400.00B</td></tr>\
                         </tbody></table>",
                    ),
                ),
        );
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(services(client), sink.clone());

        // When: /top and /marketcap are handled
        dispatcher.handle(1, Command::Top).await;
        dispatcher.handle(1, Command::MarketCap).await;

        // Then: Both replies come from the scraped ranking
        let sent = sink.sent();
        assert_eq!(
            sent[0].1,
            "Top 2 assets by market cap:\n#1 Bitcoin (BTC): $1.50T\n#2 Ethereum (ETH): $400.00B"
        );
        assert_eq!(sent[1].1, "Current BTC market cap: $1500000000000.00");
    }

    #[tokio::test]
    async fn btc_replies_with_the_spot_price() {
        // Given: A simple-price answer
        let client = Arc::new(ScriptedHttpClient::new().respond(
            format!("{COINGECKO_BASE}/simple/price"),
            HttpResponse::ok(r#"{"bitcoin": {"usd": 64250.5}}"#),
        ));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(services(client), sink.clone());

        // When: /btc is handled
        dispatcher.handle(3, Command::Btc).await;

        // Then: The price is formatted with two decimals
        assert_eq!(sink.sent(), vec![(3, String::from("Current BTC price: $64250.50"))]);
    }
}
