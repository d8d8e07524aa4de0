//! Debounced polling state machine
//!
//! [`DebouncedPoller`] owns the scheduling policy of a watch loop and none of
//! its waiting. Each [`step`](DebouncedPoller::step) either polls the watcher
//! and hands back a batch, or tells the caller how long to sleep before the
//! next poll. Sync and async drivers share it; tests drive it directly with
//! scripted watchers and never touch a clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use stakeout_core::ChangeSet;

use crate::error::WatchError;
use crate::watcher::Watcher;

/// Timing knobs for the poll loop, all in wall-clock terms.
///
/// A burst of changes is released early as soon as one poll comes back empty,
/// so `debounce` is the ceiling on batching latency, not the floor.
/// `min_sleep` must not exceed `normal_sleep`.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Longest a busy burst may accumulate before it is forced out
    pub debounce: Duration,
    /// Sleep between polls while the tree is quiet
    pub normal_sleep: Duration,
    /// Sleep between polls while a burst is accumulating; also the floor
    /// for the quiet sleep after a slow check
    pub min_sleep: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1600),
            normal_sleep: Duration::from_millis(400),
            min_sleep: Duration::from_millis(50),
        }
    }
}

/// Shared cancellation handle for a watch loop.
///
/// Clone it, hand one copy to the loop, and `set()` the other from any
/// thread to stop the loop at its next step.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop; idempotent
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the driver should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Wait this long, then call `step` again
    Sleep(Duration),
    /// A debounced batch is ready
    Release(ChangeSet),
    /// The loop is over; stop calling `step`
    Stopped,
}

/// The poll-accumulate-release cycle over any [`Watcher`].
pub struct DebouncedPoller<W> {
    watcher: W,
    config: PollConfig,
    stop: StopFlag,
    pending: ChangeSet,
    burst_started: Instant,
}

impl<W: Watcher> DebouncedPoller<W> {
    pub fn new(watcher: W, config: PollConfig) -> Self {
        Self {
            watcher,
            config,
            stop: StopFlag::new(),
            pending: ChangeSet::new(),
            burst_started: Instant::now(),
        }
    }

    /// Replace the loop's stop handle
    pub fn with_stop(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    /// Run one poll cycle.
    ///
    /// The stop flag is observed once per step, before the poll. A pending
    /// batch at stop time is discarded, matching a caller that no longer
    /// wants results.
    pub fn step(&mut self) -> Result<Step, WatchError> {
        if self.stop.is_set() {
            debug!("stop event set, stopping");
            return Ok(Step::Stopped);
        }

        if self.pending.is_empty() {
            // The burst clock starts just before its first non-empty poll
            self.burst_started = Instant::now();
        }

        let poll_started = Instant::now();
        let fresh = match self.watcher.check() {
            Ok(changes) => changes,
            Err(WatchError::Interrupted) => {
                debug!("watcher interrupted, stopping");
                return Ok(Step::Stopped);
            }
            Err(err) => return Err(err),
        };
        let check_cost = poll_started.elapsed();

        let quiesced = fresh.is_empty();
        let fresh_count = fresh.len();
        self.pending.extend(fresh);

        if !self.pending.is_empty()
            && (quiesced || self.burst_started.elapsed() >= self.config.debounce)
        {
            let batch = std::mem::take(&mut self.pending);
            debug!(
                "{} time={}ms debounced={}ms files={} changes={} ({})",
                self.watcher.root().display(),
                check_cost.as_millis(),
                self.burst_started.elapsed().as_millis(),
                self.watcher.file_count(),
                batch.len(),
                fresh_count,
            );
            trace!("released: {:?}", batch);
            return Ok(Step::Release(batch));
        }

        let sleep = if self.pending.is_empty() {
            // Quiet tree: hold the polling cadence steady by charging the
            // check against the sleep
            self.config
                .normal_sleep
                .saturating_sub(check_cost)
                .max(self.config.min_sleep)
        } else {
            self.config.min_sleep
        };
        Ok(Step::Sleep(sleep))
    }
}
