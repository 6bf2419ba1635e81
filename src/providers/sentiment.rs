//! HTTP sentiment service client.
//!
//! API: `GET {base_url}/sentiment?query=<cashtag>`
//! Response: JSON object keyed by window label, e.g.
//! `{"6H": {"averageSentiment": 0.12, "totalMessages": 40}}`.
//! A 404 means "no data for this query" and maps to `Ok(None)`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::SentimentSource;
use crate::auth::Credentials;
use crate::config::ServiceConfig;
use crate::types::{SentimentWindows, SignalError};

pub struct HttpSentimentSource {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpSentimentSource {
    pub fn new(cfg: &ServiceConfig, credentials: Credentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to build sentiment HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, query: &str) -> String {
        format!("{}/sentiment?query={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl SentimentSource for HttpSentimentSource {
    async fn sentiment(&self, query: &str) -> Result<Option<SentimentWindows>> {
        let resp = self
            .http
            .get(self.url(query))
            .header("Authorization", self.credentials.bearer())
            .send()
            .await
            .with_context(|| format!("Sentiment request failed for {query}"))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(query, "Sentiment service has no data");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SignalError::Provider {
                provider: "sentiment".into(),
                message: format!("HTTP {status}: {body}"),
            }
            .into());
        }

        let windows: SentimentWindows = resp
            .json()
            .await
            .context("Failed to parse sentiment response")?;

        Ok(if windows.is_empty() { None } else { Some(windows) })
    }
}
