//! Telegram Bot API publisher.
//!
//! API: `POST https://api.telegram.org/bot<token>/sendMessage`
//! One request per configured chat. Every failed chat adds one reason
//! to the returned `PublishError`; successful chats are not rolled back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{PublishError, Publisher};
use crate::config::{AppConfig, PublishConfig};
use crate::types::SignalError;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramPublisher {
    http: Client,
    api_url: String,
    bot_token: SecretString,
    chat_ids: Vec<String>,
}

impl TelegramPublisher {
    pub fn new(bot_token: String, chat_ids: Vec<String>) -> Result<Self> {
        if chat_ids.is_empty() {
            return Err(SignalError::Config("no Telegram chat ids configured".into()).into());
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            http,
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: SecretString::new(bot_token),
            chat_ids,
        })
    }

    /// Build from `[publish]`, resolving the token and chat ids from env.
    pub fn from_config(cfg: &PublishConfig) -> Result<Self> {
        let token_env = cfg
            .telegram_bot_token_env
            .as_deref()
            .ok_or_else(|| SignalError::Config("telegram_bot_token_env not set".into()))?;
        let chats_env = cfg
            .telegram_chat_ids_env
            .as_deref()
            .ok_or_else(|| SignalError::Config("telegram_chat_ids_env not set".into()))?;

        let token = AppConfig::resolve_env(token_env)?;
        let chat_ids = parse_chat_ids(&AppConfig::resolve_env(chats_env)?);
        Self::new(token, chat_ids)
    }

    async fn send_to(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url,
            self.bot_token.expose_secret()
        );
        let resp = self
            .http
            .post(&url)
            .json(&SendMessage {
                chat_id,
                text,
                disable_web_page_preview: true,
            })
            .send()
            .await
            .context("request error")?;

        let status = resp.status();
        let body: ApiResponse = resp
            .json()
            .await
            .with_context(|| format!("HTTP {status}, unreadable response"))?;

        if !body.ok {
            anyhow::bail!(
                "HTTP {status}: {}",
                body.description.unwrap_or_else(|| "unknown error".into())
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let mut reasons = Vec::new();

        for chat_id in &self.chat_ids {
            match self.send_to(chat_id, text).await {
                Ok(()) => debug!(chat_id, "Message delivered"),
                Err(e) => reasons.push(format!("chat {chat_id}: {e:#}")),
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(PublishError { reasons })
        }
    }
}

/// Split a comma-separated chat id list, dropping blanks.
fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
