//! Shared types for the SIGNALCAST agent.
//!
//! These types form the data model used across all modules. Everything
//! here is transient: created and consumed within a single cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Up-trend glyph used for positive sentiment and BUY signals.
pub const UP_GLYPH: &str = "📈";

/// Down-trend glyph used for negative sentiment and SELL signals.
pub const DOWN_GLYPH: &str = "📉";

/// Window label for the short sentiment average.
pub const WINDOW_6H: &str = "6H";

/// Window label for the daily sentiment average.
pub const WINDOW_24H: &str = "24H";

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// An opaque instrument identifier (e.g. "AMD").
///
/// Order in the configured list is preserved and determines output order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self(ticker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `$TICKER` form used for social sentiment queries.
    pub fn cashtag(&self) -> String {
        format!("${}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Average sentiment and message volume over one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSentiment {
    /// Signed average sentiment score.
    #[serde(alias = "averageSentiment")]
    pub average: f64,
    /// Number of messages the average was computed from.
    #[serde(alias = "totalMessages")]
    pub total_messages: u64,
}

impl WindowSentiment {
    pub fn new(average: f64, total_messages: u64) -> Self {
        Self { average, total_messages }
    }
}

impl fmt::Display for WindowSentiment {
    /// Renders as `<glyph><avg:.2>(<count>)`, e.g. `📈0.42(120)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}({})",
            sentiment_glyph(self.average),
            round_half_away(self.average, 2),
            self.total_messages
        )
    }
}

/// Sentiment keyed by window label ("6H", "24H", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentWindows(HashMap<String, WindowSentiment>);

impl SentimentWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful in tests and fixtures.
    pub fn with(mut self, label: &str, window: WindowSentiment) -> Self {
        self.0.insert(label.to_string(), window);
        self
    }

    pub fn get(&self, label: &str) -> Option<&WindowSentiment> {
        self.0.get(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Glyph for an average sentiment score: down below zero, up above zero,
/// nothing at exactly zero.
pub fn sentiment_glyph(average: f64) -> &'static str {
    if average < 0.0 {
        DOWN_GLYPH
    } else if average > 0.0 {
        UP_GLYPH
    } else {
        ""
    }
}

/// Round to `decimals` places with ties going away from zero
/// (0.125 → 0.13, 62.5 → 63). `format!` alone rounds ties to even.
pub fn round_half_away(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Direction of a single trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Buy => UP_GLYPH,
            Direction::Sell => DOWN_GLYPH,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Output of the prediction engine for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Directional predictions ordered oldest → newest.
    pub predictions: Vec<Direction>,
    /// Historical accuracy of SELL calls (0.0–1.0).
    pub sell_accuracy: f64,
    /// Historical accuracy of BUY calls (0.0–1.0).
    pub buy_accuracy: f64,
}

impl PredictionResult {
    /// Up to `n` predictions, newest first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &Direction> {
        self.predictions.iter().rev().take(n)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SIGNALCAST.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
