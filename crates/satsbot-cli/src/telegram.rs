//! Minimal Telegram Bot API client: `getUpdates` long polling and
//! `sendMessage`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use satsbot_core::{HttpClient, HttpRequest};

use crate::commands::{Command, CommandParseError, Dispatcher};
use crate::error::TelegramError;

/// Pause after a failed `getUpdates` call before polling again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot API endpoint bound to one token.
pub struct TelegramApi {
    base_url: String,
    token: String,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl TelegramApi {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout_ms: u64,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            timeout_ms,
            http_client,
        }
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = json!({ "chat_id": chat_id, "text": text });
        self.call::<Value>("sendMessage", &body, self.timeout_ms)
            .await
            .map(|_| ())
    }

    /// Long-polls for updates after `offset`. The HTTP deadline covers the
    /// poll window plus the regular request deadline.
    pub async fn get_updates(
        &self,
        offset: i64,
        poll_timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        let timeout_ms = poll_timeout_secs
            .saturating_mul(1_000)
            .saturating_add(self.timeout_ms);
        self.call("getUpdates", &body, timeout_ms).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: &Value,
        timeout_ms: u64,
    ) -> Result<T, TelegramError> {
        let url = format!("{}/bot{}/{method}", self.base_url, self.token);
        let request = HttpRequest::post_json(url, body.to_string()).with_timeout_ms(timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| TelegramError::Transport(self.redact(error.message())))?;

        let decoded: ApiResponse<T> = match serde_json::from_str(&response.body) {
            Ok(decoded) => decoded,
            Err(_) if !response.is_success() => {
                return Err(TelegramError::BadStatus {
                    status: response.status,
                })
            }
            Err(error) => return Err(TelegramError::Decode(error.to_string())),
        };

        if !decoded.ok {
            return Err(TelegramError::Rejected {
                method,
                description: decoded
                    .description
                    .unwrap_or_else(|| format!("status {}", response.status)),
            });
        }

        decoded
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method} response has no result")))
    }

    fn redact(&self, message: &str) -> String {
        if self.token.is_empty() {
            return message.to_owned();
        }
        message.replace(&self.token, "<redacted>")
    }
}

/// Update loop: tracks the offset and hands each command to its own task.
pub struct TelegramPoller {
    api: Arc<TelegramApi>,
    poll_timeout_secs: u64,
    offset: i64,
}

impl TelegramPoller {
    pub fn new(api: Arc<TelegramApi>, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            poll_timeout_secs,
            offset: 0,
        }
    }

    /// Polls until `shutdown` resolves.
    pub async fn run<S>(mut self, dispatcher: Arc<Dispatcher>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let api = Arc::clone(&self.api);
        info!(poll_timeout_secs = self.poll_timeout_secs, "bot started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                polled = api.get_updates(self.offset, self.poll_timeout_secs) => {
                    match polled {
                        Ok(updates) => self.dispatch(&dispatcher, updates),
                        Err(error) => {
                            warn!(%error, "getUpdates failed");
                            tokio::select! {
                                _ = &mut shutdown => {
                                    info!("shutdown signal received");
                                    break;
                                }
                                _ = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                            }
                        }
                    }
                }
            }
        }

        info!("bot stopped");
    }

    fn dispatch(&mut self, dispatcher: &Arc<Dispatcher>, updates: Vec<Update>) {
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);

            let Some((chat_id, command)) = command_in(&update) else {
                continue;
            };

            let dispatcher = Arc::clone(dispatcher);
            tokio::spawn(async move {
                dispatcher.handle(chat_id, command).await;
            });
        }
    }
}

/// Extracts the chat and command of an update, logging unknown commands.
fn command_in(update: &Update) -> Option<(i64, Command)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;

    match Command::parse(text) {
        Ok(command) => Some((message.chat.id, command)),
        Err(CommandParseError::NotACommand) => None,
        Err(error @ CommandParseError::Unknown(_)) => {
            debug!(update_id = update.update_id, %error, "ignoring update");
            None
        }
    }
}
