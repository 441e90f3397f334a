//! Telegram Bot API sink

use super::{DeliveryError, MessageSink};
use crate::config::TelegramConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Characters MarkdownV2 reserves; `*` and `_` are left for emphasis
const MARKDOWN_V2_RESERVED: &str = "\\[]()~`>#+-=|{}.!\"";

/// Request body of `sendMessage`
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Posts reports to a Telegram chat and alerts to an optional second chat
pub struct TelegramSink {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
    error_chat_id: Option<String>,
}

impl TelegramSink {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
            error_chat_id: config.error_chat_id.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }

    async fn post(&self, message: &SendMessage<'_>) -> Result<(), DeliveryError> {
        let response = self.client.post(self.url()).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chat_id = message.chat_id, "Telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let text = escape_markdown_v2(text);
        self.post(&SendMessage {
            chat_id: self.chat_id.as_str(),
            text: text.as_str(),
            parse_mode: Some("MarkdownV2"),
        })
        .await
    }

    async fn alert(&self, text: &str) -> Result<(), DeliveryError> {
        let Some(chat_id) = &self.error_chat_id else {
            return Ok(());
        };

        self.post(&SendMessage {
            chat_id: chat_id.as_str(),
            text,
            parse_mode: None,
        })
        .await
    }
}

/// Escape MarkdownV2 reserved characters, keeping `*` and `_` as markup
pub fn escape_markdown_v2(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut out, ch| {
        if MARKDOWN_V2_RESERVED.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
        out
    })
}
