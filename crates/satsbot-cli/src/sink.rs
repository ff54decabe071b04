use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::SinkError;
use crate::telegram::TelegramApi;

pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Outbound chat capability handed to command handlers.
pub trait MessageSink: Send + Sync {
    fn send_message<'a>(&'a self, chat_id: i64, text: &'a str) -> SinkFuture<'a>;
}

/// Delivers replies through the Bot API `sendMessage` method.
pub struct TelegramSink {
    api: Arc<TelegramApi>,
}

impl TelegramSink {
    pub fn new(api: Arc<TelegramApi>) -> Self {
        Self { api }
    }
}

impl MessageSink for TelegramSink {
    fn send_message<'a>(&'a self, chat_id: i64, text: &'a str) -> SinkFuture<'a> {
        Box::pin(async move {
            self.api.send_message(chat_id, text).await?;
            Ok(())
        })
    }
}

/// Prints replies for the one-shot `ask` command.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl MessageSink for StdoutSink {
    fn send_message<'a>(&'a self, _chat_id: i64, text: &'a str) -> SinkFuture<'a> {
        Box::pin(async move {
            writeln!(std::io::stdout(), "{text}")?;
            Ok(())
        })
    }
}
