//! Full-pipeline scenarios driven by the real scheduler on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use signalcast::engine::market_report::MarketReporter;
use signalcast::engine::retry::RetryPolicy;
use signalcast::engine::scheduler::{Schedule, Scheduler, Trigger, DAILY_PERIOD};
use signalcast::engine::sentiment_report::SentimentReporter;
use signalcast::types::*;

use crate::mocks::*;

const HOUR: Duration = Duration::from_secs(3600);

struct Harness {
    log: CallLog,
    sentiment: Arc<ScriptedSentiment>,
    publisher: Arc<RecordingPublisher>,
    scheduler: Scheduler,
}

fn symbols() -> Vec<Symbol> {
    vec![Symbol::from("AMD"), Symbol::from("GOOG")]
}

/// Daily trigger first fires after `daily_first`, interval trigger every 3h.
fn start(
    log: CallLog,
    sentiment: ScriptedSentiment,
    predictions: FixedPredictions,
    daily_first: Duration,
) -> Harness {
    let sentiment = Arc::new(sentiment);
    let publisher = Arc::new(RecordingPublisher::new(log.clone()));

    let market = Arc::new(MarketReporter::new(
        Arc::new(predictions),
        sentiment.clone(),
        publisher.clone(),
    ));
    let digest = Arc::new(SentimentReporter::new(
        sentiment.clone(),
        publisher.clone(),
        RetryPolicy::default(),
    ));

    let schedule = Schedule {
        daily: Trigger::new(daily_first, DAILY_PERIOD).unwrap(),
        interval: Trigger::every(3 * HOUR).unwrap(),
    };
    let scheduler = Scheduler::start(schedule, symbols(), market, digest);

    Harness {
        log,
        sentiment,
        publisher,
        scheduler,
    }
}

fn both_models(log: CallLog) -> FixedPredictions {
    FixedPredictions::new(log)
        .with("AMD", vec![Direction::Sell, Direction::Buy], 0.61, 0.58)
        .with("GOOG", vec![Direction::Buy], 0.55, 0.70)
}

#[tokio::test(start_paused = true)]
async fn test_daily_firing_reports_each_symbol_in_order() {
    let log = call_log();
    let sentiment = ScriptedSentiment::new(log.clone())
        .script("$AMD", vec![Some(windows("24H", 0.214, 340))])
        .script("$GOOG", vec![Some(windows("6H", -0.5, 12))]);
    let h = start(log.clone(), sentiment, both_models(log), Duration::ZERO);

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        h.publisher.messages(),
        vec![
            "$AMD trading signals (61%/58%)\nAverage sentiment: 📈0.21(340)\nT-0: 📈BUY\nT-1: 📉SELL"
                .to_string(),
            "$GOOG trading signals (55%/70%)\nT-0: 📈BUY".to_string(),
        ]
    );
    assert_eq!(
        *h.log.lock().unwrap(),
        vec![
            "sentiment $AMD",
            "predict AMD",
            "publish",
            "sentiment $GOOG",
            "predict GOOG",
            "publish",
        ]
    );

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_interval_firing_publishes_one_combined_digest() {
    let log = call_log();
    let sentiment = ScriptedSentiment::new(log.clone())
        .script("$AMD", vec![None, None, Some(windows("6H", 0.4251, 120))])
        .script("$GOOG", vec![Some(windows("6H", -1.5, 7))]);
    let h = start(log.clone(), sentiment, both_models(log), 12 * HOUR);

    tokio::time::sleep(3 * HOUR + Duration::from_secs(1)).await;

    assert_eq!(
        h.publisher.messages(),
        vec!["Last 6H average sentiment (from messages):\n$AMD: 📈0.43(120) $GOOG: 📉-1.50(7) "
            .to_string()]
    );
    assert_eq!(h.sentiment.calls_for("$AMD"), 3);
    assert_eq!(h.sentiment.calls_for("$GOOG"), 1);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_digest_without_any_data_publishes_empty_message() {
    let log = call_log();
    let sentiment = ScriptedSentiment::new(log.clone());
    let h = start(log.clone(), sentiment, both_models(log), 12 * HOUR);

    tokio::time::sleep(3 * HOUR + Duration::from_secs(1)).await;

    assert_eq!(h.publisher.messages(), vec![String::new()]);
    assert_eq!(h.sentiment.calls_for("$AMD"), 3);
    assert_eq!(h.sentiment.calls_for("$GOOG"), 3);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_prediction_failure_ends_cycle_but_not_trigger() {
    let log = call_log();
    let sentiment = ScriptedSentiment::new(log.clone());
    // GOOG has no model: its prediction fails hard.
    let predictions = FixedPredictions::new(log.clone())
        .with("AMD", vec![Direction::Sell], 0.6, 0.4);
    let h = start(log.clone(), sentiment, predictions, Duration::ZERO);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.publisher.messages().len(), 1);
    assert!(h.publisher.messages()[0].starts_with("$AMD trading signals"));

    // Next day's firing still happens, and the interval trigger is unaffected.
    tokio::time::sleep(DAILY_PERIOD).await;
    let market_messages = h
        .publisher
        .messages()
        .iter()
        .filter(|m| m.contains("trading signals"))
        .count();
    assert_eq!(market_messages, 2);
    let digests = h
        .publisher
        .messages()
        .iter()
        .filter(|m| !m.contains("trading signals"))
        .count();
    assert_eq!(digests, 8);

    h.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_publish_failures_are_swallowed() {
    let log = call_log();
    let sentiment = ScriptedSentiment::new(log.clone());
    let h = start(log.clone(), sentiment, both_models(log), Duration::from_secs(60));
    h.publisher
        .set_failure(&["chat 1: HTTP 403 Forbidden", "chat 2: request error"]);

    tokio::time::sleep(Duration::from_secs(120)).await;

    let publishes = h.log.lock().unwrap().iter().filter(|c| *c == "publish").count();
    assert_eq!(publishes, 2);
    assert!(h.publisher.messages().is_empty());

    h.scheduler.shutdown().await;
}
