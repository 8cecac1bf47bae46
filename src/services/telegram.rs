//! Telegram Bot API notifier.

use crate::config::TelegramConfig;
use crate::services::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    chat_id: String,
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.base_url.trim_end_matches('/'),
            config.bot_token
        );
        Ok(Self {
            client,
            chat_id: config.chat_id.clone(),
            endpoint,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };
        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(chat_id = %self.chat_id, "telegram message delivered");
        Ok(())
    }
}
