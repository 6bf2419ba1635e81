//! Cycle scheduler.
//!
//! Owns the two recurring triggers: a daily time-of-day trigger driving
//! the market reporter and a fixed-interval trigger driving the
//! sentiment reporter. Each trigger is its own task; they share nothing
//! but the shutdown signal.
//!
//! Within a trigger, firings never overlap. A tick that comes due while
//! the previous run is still going is delayed until it finishes. Every
//! run executes in a spawned task so an error or panic ends that run
//! only, and the trigger stays armed.

use anyhow::Result;
use chrono::{DateTime, NaiveTime, TimeZone};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::Reporter;
use crate::types::{SignalError, Symbol};

/// Period of the market trigger.
pub const DAILY_PERIOD: Duration = Duration::from_secs(24 * 3600);

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// When a recurring source first fires, and how often after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub first_delay: Duration,
    pub period: Duration,
}

impl Trigger {
    pub fn new(first_delay: Duration, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(SignalError::Config("trigger period must be non-zero".into()).into());
        }
        Ok(Self {
            first_delay,
            period,
        })
    }

    /// Fires every `period`, first firing one period from now.
    pub fn every(period: Duration) -> Result<Self> {
        Self::new(period, period)
    }

    /// Fires daily at `offset` past local midnight of `now`'s timezone.
    /// If today's anchor has already passed, the first firing is immediate.
    pub fn daily_at<Tz: TimeZone>(offset: Duration, now: DateTime<Tz>) -> Result<Self> {
        Self::new(delay_until_anchor(offset, now), DAILY_PERIOD)
    }
}

/// Time from `now` until today's anchor, or zero if the anchor is
/// already behind us.
///
/// The anchor is the wall-clock time `offset` past midnight, resolved in
/// `now`'s timezone, so DST changes earlier in the day are accounted for.
/// If that wall-clock time does not exist (skipped by a DST jump), the
/// anchor is `offset` of elapsed time after midnight instead.
pub fn delay_until_anchor<Tz: TimeZone>(offset: Duration, now: DateTime<Tz>) -> Duration {
    let tz = now.timezone();
    let offset = chrono::Duration::from_std(offset).unwrap_or_else(|_| chrono::Duration::zero());
    let midnight = now.date_naive().and_time(NaiveTime::MIN);

    let anchor = tz
        .from_local_datetime(&(midnight + offset))
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&midnight)
                .earliest()
                .map(|m| m + offset)
        });

    match anchor {
        Some(anchor) => (anchor - now).to_std().unwrap_or(Duration::ZERO),
        None => Duration::ZERO,
    }
}

/// The two triggers the scheduler runs.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Drives the market reporter.
    pub daily: Trigger,
    /// Drives the sentiment reporter.
    pub interval: Trigger,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Handle to the running triggers. Dropping it without calling
/// `shutdown` stops both triggers at their next wake-up.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    triggers: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    /// Start both triggers over the same ordered symbol list.
    pub fn start(
        schedule: Schedule,
        symbols: Vec<Symbol>,
        market: Arc<dyn Reporter>,
        sentiment: Arc<dyn Reporter>,
    ) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let symbols: Arc<[Symbol]> = symbols.into();

        info!(
            symbols = symbols.len(),
            daily_first_in_secs = schedule.daily.first_delay.as_secs(),
            interval_secs = schedule.interval.period.as_secs(),
            "Scheduler starting"
        );

        let triggers = vec![
            (
                market.kind(),
                spawn_trigger(schedule.daily, market, symbols.clone(), rx.clone()),
            ),
            (
                sentiment.kind(),
                spawn_trigger(schedule.interval, sentiment, symbols, rx),
            ),
        ];

        Self { shutdown, triggers }
    }

    /// Stop future firings on both triggers and wait for any in-flight
    /// cycle to run to completion.
    pub async fn shutdown(self) {
        info!("Scheduler shutting down");
        self.shutdown.send_replace(true);

        let (kinds, handles): (Vec<_>, Vec<_>) = self.triggers.into_iter().unzip();
        for (kind, result) in kinds.into_iter().zip(futures::future::join_all(handles).await) {
            if let Err(e) = result {
                error!(kind, error = %e, "Trigger task ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }
}

fn spawn_trigger(
    trigger: Trigger,
    reporter: Arc<dyn Reporter>,
    symbols: Arc<[Symbol]>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + trigger.first_delay, trigger.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut firing: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    firing += 1;
                    run_firing(reporter.clone(), symbols.clone(), firing).await;
                }
            }
        }
        info!(kind = reporter.kind(), firings = firing, "Trigger stopped");
    })
}

/// Run one cycle in its own task and log the outcome.
async fn run_firing(reporter: Arc<dyn Reporter>, symbols: Arc<[Symbol]>, firing: u64) {
    let kind = reporter.kind();
    let cycle_id = Uuid::new_v4();
    let span = info_span!("cycle", kind, %cycle_id, firing);
    let started = Instant::now();

    info!(parent: &span, symbols = symbols.len(), "Starting cycle");

    let task = tokio::spawn(
        async move { reporter.run_cycle(&symbols).await }.instrument(span.clone()),
    );

    match task.await {
        Ok(Ok(summary)) => info!(
            parent: &span,
            symbols = summary.symbols,
            published = summary.published,
            degraded = summary.degraded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cycle complete"
        ),
        Ok(Err(e)) => error!(parent: &span, error = %format!("{e:#}"), "Cycle failed, continuing to next"),
        Err(e) => error!(parent: &span, error = %e, "Cycle task aborted, continuing to next"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
