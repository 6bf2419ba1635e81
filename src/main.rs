//! SIGNALCAST — scheduled trading-signal and sentiment digests
//!
//! Entry point. Loads configuration, initialises structured logging,
//! obtains service credentials, and runs the daily market cycle and the
//! periodic sentiment cycle until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use signalcast::auth;
use signalcast::config::{self, PublishMode};
use signalcast::engine::market_report::MarketReporter;
use signalcast::engine::retry::RetryPolicy;
use signalcast::engine::scheduler::{Schedule, Scheduler, Trigger};
use signalcast::engine::sentiment_report::SentimentReporter;
use signalcast::providers::prediction::HttpPredictionEngine;
use signalcast::providers::sentiment::HttpSentimentSource;
use signalcast::providers::SentimentSource;
use signalcast::publish::telegram::TelegramPublisher;
use signalcast::publish::{LogPublisher, Publisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("SIGNALCAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    info!(
        agent_name = %cfg.agent.name,
        symbols = cfg.agent.symbols.len(),
        daily_offset_secs = cfg.schedule.daily_offset_secs,
        interval_secs = cfg.schedule.interval_secs,
        "SIGNALCAST starting up"
    );

    // -- Credentials -----------------------------------------------------

    let provider = auth::from_config(&cfg.auth);
    let credentials = provider
        .obtain()
        .await
        .with_context(|| format!("Failed to obtain credentials ({})", provider.name()))?;
    info!(strategy = provider.name(), "Credentials obtained");

    // -- Collaborators ---------------------------------------------------

    let sentiment: Arc<dyn SentimentSource> =
        Arc::new(HttpSentimentSource::new(&cfg.sentiment, credentials.clone())?);
    let engine = Arc::new(HttpPredictionEngine::new(&cfg.prediction, credentials)?);

    let publisher: Arc<dyn Publisher> = match cfg.publish.mode {
        PublishMode::Telegram => Arc::new(TelegramPublisher::from_config(&cfg.publish)?),
        PublishMode::Log => {
            info!("Publishing in dry-run mode (log only)");
            Arc::new(LogPublisher)
        }
    };

    let market = Arc::new(MarketReporter::new(engine, sentiment.clone(), publisher.clone()));
    let sentiment_digest = Arc::new(SentimentReporter::new(
        sentiment,
        publisher,
        RetryPolicy::from_config(&cfg.retry),
    ));

    // -- Schedule --------------------------------------------------------

    let schedule = Schedule {
        daily: Trigger::daily_at(cfg.schedule.daily_offset(), chrono::Local::now())?,
        interval: Trigger::every(cfg.schedule.interval())?,
    };
    let scheduler = Scheduler::start(schedule, cfg.agent.symbols.clone(), market, sentiment_digest);

    info!("Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received.");

    scheduler.shutdown().await;
    info!("SIGNALCAST shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signalcast=info"));

    if std::env::var("SIGNALCAST_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
