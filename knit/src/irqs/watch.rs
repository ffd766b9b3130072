//! IRQ watch loop
//!
//! Takes a baseline reading, then re-reads the counters every period until the
//! tick limit is reached or the shutdown future completes. Each tick may be
//! reported as a delta against the previous reading; the run ends with a
//! summary delta between the baseline and the last successful reading.
//!
//! ```text
//! Idle ──baseline──▶ Sampling(1) ──tick──▶ Sampling(2) ──▶ … ──▶ Terminated
//!                        │                                          ▲
//!                        └──── shutdown / limit reached / limit 0 ──┘
//! ```

use chrono::{DateTime, Local};
use log::{debug, info};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::stats::{Delta, Snapshot, StatsSource};
use crate::config::WatchConfig;
use crate::domain::KnitError;

/// Receives the records produced by the watch loop.
pub trait WatchSink {
    /// # Errors
    /// Fails if the record cannot be written out.
    fn tick(&mut self, at: DateTime<Local>, delta: &Delta) -> Result<(), KnitError>;

    /// # Errors
    /// Fails if the record cannot be written out.
    fn summary(&mut self, elapsed: Duration, delta: &Delta) -> Result<(), KnitError>;
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of ticks ran (immediately for a limit of 0)
    LimitReached,
    Interrupted,
}

#[derive(Debug)]
pub struct WatchOutcome {
    pub ticks: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
    /// Baseline to last reading, unfiltered
    pub summary: Delta,
}

/// Readings the loop keeps between ticks. The baseline never changes;
/// `previous` is replaced by every successful read.
struct SampleWindow {
    baseline: Snapshot,
    previous: Snapshot,
}

impl SampleWindow {
    fn new(baseline: Snapshot) -> Self {
        let previous = baseline.clone();
        Self { baseline, previous }
    }

    fn advance(&mut self, latest: Snapshot) -> Delta {
        let delta = self.previous.delta(&latest);
        self.previous = latest;
        delta
    }

    fn summary(&self) -> Delta {
        self.baseline.delta(&self.previous)
    }
}

pub struct IrqWatcher<S> {
    config: WatchConfig,
    source: S,
}

impl<S: StatsSource> IrqWatcher<S> {
    pub fn new(config: WatchConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Run the loop to completion.
    ///
    /// `shutdown` is polled before every tick, so a reading already in
    /// progress always completes first.
    ///
    /// # Errors
    /// A failed read (baseline or tick) aborts the loop without a summary, as
    /// does a sink error.
    pub async fn run<F, K>(&self, shutdown: F, sink: &mut K) -> Result<WatchOutcome, KnitError>
    where
        F: Future<Output = ()>,
        K: WatchSink,
    {
        let started = Instant::now();
        let mut window = SampleWindow::new(self.source.read_stats()?);
        let mut ticks = 0u64;

        let reason = if self.config.limit.reached(ticks) {
            debug!("watch limit is zero, skipping sampling");
            StopReason::LimitReached
        } else {
            let period = self.config.period;
            let mut ticker = interval_at(started + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    biased;
                    () = &mut shutdown => {
                        info!("interrupted after {ticks} ticks");
                        break StopReason::Interrupted;
                    }
                    _ = ticker.tick() => {
                        let latest = self.source.read_stats()?;
                        ticks += 1;
                        let delta = window.advance(latest);
                        if self.config.emits_ticks() {
                            sink.tick(Local::now(), &delta)?;
                        }
                        if self.config.limit.reached(ticks) {
                            break StopReason::LimitReached;
                        }
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        let summary = window.summary();
        if self.config.emits_summary() {
            sink.summary(elapsed, &summary)?;
        }

        Ok(WatchOutcome { ticks, elapsed, reason, summary })
    }
}
