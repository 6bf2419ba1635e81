//! HTTP prediction engine client.
//!
//! API: `GET {base_url}/predict/{symbol}`
//! Response: `{"predictions": ["SELL", "BUY"], "sell_accuracy": 0.61, "buy_accuracy": 0.58}`
//! with predictions ordered oldest → newest.
//!
//! Model inference can take minutes, so the configured timeout is
//! usually much longer than the sentiment client's. Failures are not
//! retried here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::PredictionEngine;
use crate::auth::Credentials;
use crate::config::ServiceConfig;
use crate::types::{PredictionResult, SignalError, Symbol};

pub struct HttpPredictionEngine {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpPredictionEngine {
    pub fn new(cfg: &ServiceConfig, credentials: Credentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to build prediction HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, symbol: &Symbol) -> String {
        format!("{}/predict/{}", self.base_url, urlencoding::encode(symbol.as_str()))
    }
}

#[async_trait]
impl PredictionEngine for HttpPredictionEngine {
    async fn predict(&self, symbol: &Symbol) -> Result<PredictionResult> {
        debug!(%symbol, "Requesting prediction");

        let resp = self
            .http
            .get(self.url(symbol))
            .header("Authorization", self.credentials.bearer())
            .send()
            .await
            .with_context(|| format!("Prediction request failed for {symbol}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SignalError::Provider {
                provider: "prediction".into(),
                message: format!("HTTP {status} for {symbol}: {body}"),
            }
            .into());
        }

        resp.json::<PredictionResult>()
            .await
            .with_context(|| format!("Failed to parse prediction for {symbol}"))
    }
}
