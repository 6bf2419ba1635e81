//! Market signal cycle.
//!
//! For each symbol, in order, fetches the 24H sentiment and the model
//! prediction concurrently, then publishes one message per symbol:
//!
//! ```text
//! $AMD trading signals (61%/58%)
//! Average sentiment: 📈0.21(340)
//! T-0: 📈BUY
//! T-1: 📉SELL
//! ```
//!
//! Symbols never overlap: one symbol's message is published before the
//! next symbol's lookups start.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{CycleSummary, Reporter};
use crate::providers::{PredictionEngine, SentimentSource};
use crate::publish::{deliver, Publisher};
use crate::types::{round_half_away, PredictionResult, Symbol, WindowSentiment, WINDOW_24H};

/// Number of most recent predictions shown per symbol.
pub const SIGNAL_HORIZON: usize = 2;

pub struct MarketReporter {
    engine: Arc<dyn PredictionEngine>,
    sentiment: Arc<dyn SentimentSource>,
    publisher: Arc<dyn Publisher>,
}

impl MarketReporter {
    pub fn new(
        engine: Arc<dyn PredictionEngine>,
        sentiment: Arc<dyn SentimentSource>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            engine,
            sentiment,
            publisher,
        }
    }

    /// Render one symbol's report.
    ///
    /// Sequences shorter than the horizon render only the entries that
    /// exist; an empty sequence renders no `T-` lines at all.
    pub fn render(
        symbol: &Symbol,
        prediction: &PredictionResult,
        sentiment: Option<&WindowSentiment>,
    ) -> String {
        let mut lines = vec![format!(
            "${symbol} trading signals ({:.0}%/{:.0}%)",
            round_half_away(prediction.sell_accuracy * 100.0, 0),
            round_half_away(prediction.buy_accuracy * 100.0, 0)
        )];

        if let Some(window) = sentiment {
            lines.push(format!("Average sentiment: {window}"));
        }

        for (i, direction) in prediction.latest(SIGNAL_HORIZON).enumerate() {
            lines.push(format!("T-{i}: {}{direction}", direction.glyph()));
        }

        lines.join("\n")
    }

    /// Analyse and publish a single symbol. Returns (published, degraded).
    async fn report_symbol(&self, symbol: &Symbol) -> Result<(bool, bool)> {
        let query = symbol.cashtag();

        // Sentiment is polled first so the request goes out before the
        // (much slower) prediction starts.
        let (sentiment, prediction) = tokio::join!(
            self.sentiment.sentiment(&query),
            self.engine.predict(symbol),
        );
        let prediction = prediction.with_context(|| format!("Prediction failed for {symbol}"))?;
        let sentiment = sentiment.with_context(|| format!("Sentiment lookup failed for {symbol}"))?;

        let window = sentiment.as_ref().and_then(|w| w.get(WINDOW_24H));
        if window.is_none() {
            warn!(
                %symbol,
                no_data = sentiment.is_none(),
                "No 24H sentiment, omitting sentiment line"
            );
        }

        debug!(
            %symbol,
            predictions = prediction.predictions.len(),
            "Prediction received"
        );

        let report = Self::render(symbol, &prediction, window);
        let published = deliver(self.publisher.as_ref(), &report).await;
        Ok((published, window.is_none()))
    }
}

#[async_trait]
impl Reporter for MarketReporter {
    async fn run_cycle(&self, symbols: &[Symbol]) -> Result<CycleSummary> {
        let mut summary = CycleSummary {
            symbols: symbols.len(),
            ..CycleSummary::default()
        };

        for symbol in symbols {
            let (published, degraded) = self.report_symbol(symbol).await?;
            summary.published += usize::from(published);
            summary.degraded += usize::from(degraded);
        }

        info!(
            symbols = summary.symbols,
            published = summary.published,
            degraded = summary.degraded,
            "Market signals complete"
        );

        Ok(summary)
    }

    fn kind(&self) -> &'static str {
        "market"
    }
}
