//! Core engine: bounded retry, the two reporters and the scheduler that
//! drives them.

pub mod market_report;
pub mod retry;
pub mod scheduler;
pub mod sentiment_report;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Symbol;

/// Outcome of one reporter cycle, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Symbols processed.
    pub symbols: usize,
    /// Messages delivered successfully.
    pub published: usize,
    /// Symbols whose sentiment clause was omitted.
    pub degraded: usize,
}

/// A component that consumes one triggered cycle and publishes text.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Run over the full symbol list. An `Err` aborts this cycle only.
    async fn run_cycle(&self, symbols: &[Symbol]) -> Result<CycleSummary>;

    /// Short cycle kind for logs ("market", "sentiment").
    fn kind(&self) -> &'static str;
}
