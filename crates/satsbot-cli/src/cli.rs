//! CLI argument definitions for satsbot.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Long-poll Telegram and answer chat commands |
//! | `ask` | Answer one chat command on stdout |
//! | `sources` | Print the configured market-cap source chain as JSON |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--timeout-ms` | `SATSBOT_HTTP_TIMEOUT_MS` or `8000` | Per-request deadline |
//!
//! # Examples
//!
//! ```bash
//! BOT_TOKEN=123:abc satsbot run
//! satsbot ask /top
//! satsbot sources --pretty
//! ```

use clap::{Args, Parser, Subcommand};

/// Bitcoin market statistics for Telegram chats.
#[derive(Debug, Parser)]
#[command(name = "satsbot", author, version, about = "Bitcoin market statistics chat bot")]
pub struct Cli {
    /// Per-request deadline in milliseconds; overrides SATSBOT_HTTP_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bot until interrupted with Ctrl-C.
    ///
    /// Requires BOT_TOKEN.
    Run,

    /// Answer a single chat command and print the reply.
    ///
    /// # Examples
    ///
    ///   satsbot ask /btc
    ///   satsbot ask "/top@satsbot"
    Ask(AskArgs),

    /// Print the market-cap source chain in attempt order.
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Chat command, e.g. `/fees`.
    pub command: String,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
