//! In-memory collaborators for integration testing.
//!
//! Deterministic implementations of the provider and publisher traits.
//! Every call is recorded so tests can assert on order and counts.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use signalcast::providers::{PredictionEngine, SentimentSource};
use signalcast::publish::{PublishError, Publisher};
use signalcast::types::*;

/// Shared, ordered log of provider and publisher calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Sentiment source that replays a script of answers per query.
/// Once a script is used up, the last answer repeats; unknown queries
/// have no data.
pub struct ScriptedSentiment {
    scripts: Mutex<HashMap<String, VecDeque<Option<SentimentWindows>>>>,
    last: Mutex<HashMap<String, Option<SentimentWindows>>>,
    log: CallLog,
}

impl ScriptedSentiment {
    pub fn new(log: CallLog) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            last: Mutex::new(HashMap::new()),
            log,
        }
    }

    pub fn script(self, query: &str, answers: Vec<Option<SentimentWindows>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(query.to_string(), answers.into());
        self
    }

    pub fn calls_for(&self, query: &str) -> usize {
        let needle = format!("sentiment {query}");
        self.log.lock().unwrap().iter().filter(|c| **c == needle).count()
    }
}

#[async_trait]
impl SentimentSource for ScriptedSentiment {
    async fn sentiment(&self, query: &str) -> Result<Option<SentimentWindows>> {
        self.log.lock().unwrap().push(format!("sentiment {query}"));

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(|s| s.pop_front());
        let mut last = self.last.lock().unwrap();
        match next {
            Some(answer) => {
                last.insert(query.to_string(), answer.clone());
                Ok(answer)
            }
            None => Ok(last.get(query).cloned().flatten()),
        }
    }
}

pub fn windows(label: &str, average: f64, total_messages: u64) -> SentimentWindows {
    SentimentWindows::new().with(label, WindowSentiment::new(average, total_messages))
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Prediction engine with fixed answers per symbol.
pub struct FixedPredictions {
    answers: HashMap<String, PredictionResult>,
    log: CallLog,
}

impl FixedPredictions {
    pub fn new(log: CallLog) -> Self {
        Self {
            answers: HashMap::new(),
            log,
        }
    }

    pub fn with(mut self, symbol: &str, predictions: Vec<Direction>, sell: f64, buy: f64) -> Self {
        self.answers.insert(
            symbol.to_string(),
            PredictionResult {
                predictions,
                sell_accuracy: sell,
                buy_accuracy: buy,
            },
        );
        self
    }
}

#[async_trait]
impl PredictionEngine for FixedPredictions {
    async fn predict(&self, symbol: &Symbol) -> Result<PredictionResult> {
        self.log.lock().unwrap().push(format!("predict {symbol}"));
        self.answers
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no model for {symbol}"))
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Publisher that records every message and can be told to fail.
pub struct RecordingPublisher {
    messages: Mutex<Vec<String>>,
    fail_with: Mutex<Option<Vec<String>>>,
    log: CallLog,
}

impl RecordingPublisher {
    pub fn new(log: CallLog) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
            log,
        }
    }

    /// Make every subsequent publish fail with these reasons.
    pub fn set_failure(&self, reasons: &[&str]) {
        *self.fail_with.lock().unwrap() = Some(reasons.iter().map(|r| r.to_string()).collect());
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        self.log.lock().unwrap().push("publish".to_string());
        if let Some(reasons) = self.fail_with.lock().unwrap().clone() {
            return Err(PublishError { reasons });
        }
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
