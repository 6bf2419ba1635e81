//! External analysis providers.
//!
//! Defines the `SentimentSource` and `PredictionEngine` traits the
//! reporters consume, and HTTP/JSON clients for both services.
//! How scores and predictions are computed is the services' business.

pub mod prediction;
pub mod sentiment;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::types::{PredictionResult, SentimentWindows, Symbol};

/// Social-sentiment lookup.
///
/// `Ok(None)` means the service has no data for the query. That is a
/// normal outcome, distinct from `Err`, which is a hard failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn sentiment(&self, query: &str) -> Result<Option<SentimentWindows>>;
}

/// Trading-signal prediction engine. May be slow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PredictionEngine: Send + Sync {
    async fn predict(&self, symbol: &Symbol) -> Result<PredictionResult>;
}
