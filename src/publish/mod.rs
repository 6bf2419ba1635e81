//! Report delivery.
//!
//! Defines the `Publisher` trait and a best-effort `deliver` helper.
//! Delivery never fails a cycle: errors are logged per reason and
//! dropped. Implementations:
//! - `TelegramPublisher` — Bot API `sendMessage` to one or more chats
//! - `LogPublisher` — dry run, writes the report to the log

pub mod telegram;

use async_trait::async_trait;
use tracing::{error, info};

#[cfg(test)]
use mockall::automock;

/// A delivery failure, possibly with several independent causes
/// (e.g. one per destination chat).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Publish failed: {}", .reasons.join("; "))]
pub struct PublishError {
    pub reasons: Vec<String>,
}

impl PublishError {
    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }
}

/// Abstraction over report delivery channels.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str) -> Result<(), PublishError>;
}

/// Publish `text`, logging and swallowing any failure.
///
/// Returns whether delivery succeeded so callers can count it.
pub async fn deliver(publisher: &dyn Publisher, text: &str) -> bool {
    match publisher.publish(text).await {
        Ok(()) => true,
        Err(e) => {
            for reason in &e.reasons {
                error!(reason = %reason, "Report delivery failed");
            }
            false
        }
    }
}

/// Dry-run publisher.
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        info!(chars = text.chars().count(), "[DRY RUN] Would publish:\n{text}");
        Ok(())
    }
}
