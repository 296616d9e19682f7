use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Message delivery interface.
///
/// Abstracts the Telegram call so tests can substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` to the configured recipient. No retries; the caller
    /// decides what a failure means.
    async fn send_message(&self, text: &str) -> Result<(), AppError>;
}

/// Arc-wrapped Notifier (Clone support).
pub type SharedNotifier = Arc<dyn Notifier>;

/// `sendMessage` request payload.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub text: String,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
    result: Option<serde_json::Value>,
}

/// Telegram Bot API client bound to one chat.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    chat_id: String,
    client: Client,
    enabled: bool,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, token, chat_id)
    }

    /// Points the client at a different API host. Used by tests.
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            client: Client::new(),
            enabled: true,
        }
    }

    /// Creates a client that skips sends (for tests and dry runs).
    pub fn disabled() -> Self {
        Self {
            api_base: TELEGRAM_API_BASE.to_string(),
            token: String::new(),
            chat_id: String::new(),
            client: Client::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.token.is_empty()
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Resolves the bot's username via `getMe`.
    ///
    /// Startup probe: validates the token and gives the log a bot name.
    pub async fn me(&self) -> Result<String, AppError> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| AppError::Notify(format!("getMe request failed: {}", e)))?;

        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| AppError::Notify(format!("getMe returned malformed body: {}", e)))?;

        if !body.ok {
            return Err(AppError::Notify(format!(
                "getMe rejected: {}",
                body.description.unwrap_or_default()
            )));
        }

        body.result
            .as_ref()
            .and_then(|r| r.get("username"))
            .and_then(|u| u.as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::Notify("getMe result has no username".to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, text: &str) -> Result<(), AppError> {
        if !self.is_enabled() {
            tracing::debug!("Telegram sends disabled, skipping");
            return Ok(());
        }

        let payload = SendMessageRequest {
            chat_id: self.chat_id.clone(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach Telegram");
                AppError::Notify(e.to_string())
            })?;

        let status = response.status();
        let body: TelegramResponse = response.json().await.map_err(|e| {
            AppError::Notify(format!("HTTP {}, malformed body: {}", status, e))
        })?;

        if !body.ok {
            let description = body.description.unwrap_or_default();
            tracing::error!(status = %status, description = %description, "Telegram rejected message");
            return Err(AppError::Notify(format!(
                "HTTP {}: {}",
                status, description
            )));
        }

        tracing::info!("Telegram message sent");
        Ok(())
    }
}
