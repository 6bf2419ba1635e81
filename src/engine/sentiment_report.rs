//! Sentiment summary cycle.
//!
//! Looks up the 6H sentiment window for every symbol in order (with
//! bounded retry on "no data"), and publishes one combined message:
//!
//! ```text
//! Last 6H average sentiment (from messages):
//! $AMD: 📈0.42(120) $GOOG: 📉-0.10(35)
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::retry::RetryPolicy;
use super::{CycleSummary, Reporter};
use crate::providers::SentimentSource;
use crate::publish::{deliver, Publisher};
use crate::types::{Symbol, WindowSentiment, WINDOW_6H};

pub const SENTIMENT_HEADER: &str = "Last 6H average sentiment (from messages):";

pub struct SentimentReporter {
    source: Arc<dyn SentimentSource>,
    publisher: Arc<dyn Publisher>,
    retry: RetryPolicy,
}

impl SentimentReporter {
    pub fn new(
        source: Arc<dyn SentimentSource>,
        publisher: Arc<dyn Publisher>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            publisher,
            retry,
        }
    }

    /// `$AMD: 📈0.42(120) ` (trailing space included).
    fn clause(symbol: &Symbol, window: &WindowSentiment) -> String {
        format!("${symbol}: {window} ")
    }

    /// Prefix the header when at least one clause was produced.
    fn render(clauses: &str) -> String {
        if clauses.is_empty() {
            String::new()
        } else {
            format!("{SENTIMENT_HEADER}\n{clauses}")
        }
    }
}

#[async_trait]
impl Reporter for SentimentReporter {
    async fn run_cycle(&self, symbols: &[Symbol]) -> Result<CycleSummary> {
        let mut clauses = String::new();
        let mut degraded = 0;

        for symbol in symbols {
            let query = symbol.cashtag();
            let windows = self
                .retry
                .until_some(|| self.source.sentiment(&query))
                .await?;

            match windows.as_ref().and_then(|w| w.get(WINDOW_6H)) {
                Some(window) => clauses.push_str(&Self::clause(symbol, window)),
                None => {
                    degraded += 1;
                    warn!(
                        %symbol,
                        exhausted = windows.is_none(),
                        attempts = self.retry.max_attempts(),
                        "No 6H sentiment, omitting from summary"
                    );
                }
            }
        }

        let report = Self::render(&clauses);
        let published = usize::from(deliver(self.publisher.as_ref(), &report).await);

        info!(
            symbols = symbols.len(),
            with_data = symbols.len() - degraded,
            published,
            "Sentiment summary complete"
        );

        Ok(CycleSummary {
            symbols: symbols.len(),
            published,
            degraded,
        })
    }

    fn kind(&self) -> &'static str {
        "sentiment"
    }
}
