//! Periodic driver for sync passes.
//!
//! One pass at a time on the blocking pool, then a sleep: the base interval
//! after a pass that finished, the current backoff after a pass that failed
//! outright. The shutdown signal is checked before every pass and raced
//! against every sleep.

use std::sync::Arc;
use std::time::Duration;

use humansize::{format_size, DECIMAL};
use tokio::sync::watch;

use crate::sync::engine::MirrorEngine;
use crate::sync::error::PassError;
use crate::sync::report::SyncStats;

/// Default cap for the backoff interval
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Exponential backoff between failed passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// `max` is raised to `base` if smaller.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            current: base,
        }
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay the next failure will sleep for
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Reset after a pass that completed; returns the delay to sleep.
    pub fn on_success(&mut self) -> Duration {
        self.current = self.base;
        self.base
    }

    /// Returns the delay to sleep, then doubles it for next time (capped).
    pub fn on_failure(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Backoff,
    Stopped,
}

/// Why [`Scheduler::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown was requested.
    Interrupted,
    /// The shutdown sender went away without a request.
    SignalLost,
}

/// Drives [`MirrorEngine`] passes until shut down.
pub struct Scheduler {
    engine: Arc<MirrorEngine>,
    backoff: Backoff,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(engine: MirrorEngine, interval: Duration, max_backoff: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            backoff: Backoff::new(interval, max_backoff),
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run passes until `shutdown` becomes true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> StopReason {
        let reason = loop {
            if *shutdown.borrow_and_update() {
                break StopReason::Interrupted;
            }

            let outcome = self.pass().await;
            let delay = self.record(outcome);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break StopReason::SignalLost;
                    }
                }
            }
        };

        self.state = SchedulerState::Stopped;
        match reason {
            StopReason::Interrupted => {
                tracing::info!("synchronization interrupted by user, exiting")
            }
            StopReason::SignalLost => {
                tracing::warn!("shutdown channel closed, stopping synchronization")
            }
        }
        reason
    }

    /// Run a single pass, logging it like `run` does.
    pub async fn run_once(&mut self) -> Result<SyncStats, PassError> {
        let outcome = self.pass().await;
        match &outcome {
            Ok(stats) => log_completed(stats),
            Err(e) => tracing::error!(error = %e, "synchronization pass failed"),
        }
        self.state = SchedulerState::Idle;
        outcome
    }

    async fn pass(&mut self) -> Result<SyncStats, PassError> {
        self.state = SchedulerState::Running;
        let engine = Arc::clone(&self.engine);

        match tokio::task::spawn_blocking(move || engine.run_pass()).await {
            Ok(outcome) => outcome,
            Err(e) => Err(PassError::Aborted(e.to_string())),
        }
    }

    /// Fold a pass outcome into the backoff state and return the delay
    /// before the next pass.
    pub fn record(&mut self, outcome: Result<SyncStats, PassError>) -> Duration {
        match outcome {
            Ok(stats) => {
                log_completed(&stats);
                self.state = SchedulerState::Idle;
                self.backoff.on_success()
            }
            Err(e) => {
                let delay = self.backoff.on_failure();
                tracing::error!(
                    error = %e,
                    retry_in_secs = delay.as_secs(),
                    "synchronization pass failed"
                );
                self.state = SchedulerState::Backoff;
                delay
            }
        }
    }
}

fn log_completed(stats: &SyncStats) {
    tracing::info!(
        created = stats.files_created,
        updated = stats.files_updated,
        symlinks = stats.symlinks_created,
        dirs = stats.dirs_created,
        deleted = stats.entries_deleted,
        unchanged = stats.unchanged,
        failed = stats.failed,
        copied = %format_size(stats.bytes_copied, DECIMAL),
        "synchronization completed"
    );
}
