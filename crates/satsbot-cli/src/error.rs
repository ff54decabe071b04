use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] satsbot_core::ValidationError),

    #[error("invalid value for {name}: {reason}")]
    Config { name: &'static str, reason: String },

    #[error("BOT_TOKEN environment variable is not set")]
    MissingToken,

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config { .. } | Self::MissingToken => 2,
            Self::Command(_) => 2,
            Self::Telegram(_) => 3,
            Self::Serialization(_) => 4,
        }
    }
}

/// Failures talking to the Telegram Bot API. Messages never contain the
/// bot token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Transport(String),

    #[error("telegram returned status {status}")]
    BadStatus { status: u16 },

    #[error("telegram rejected {method}: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },

    #[error("telegram response could not be decoded: {0}")]
    Decode(String),
}

/// Failures delivering a reply.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error("failed to write reply: {0}")]
    Io(#[from] std::io::Error),
}
