//! Blocking and async drivers for the poll loop
//!
//! Both drivers interpret [`Step`]s from the shared [`DebouncedPoller`]; the
//! only difference between them is how they wait. [`Batches`] blocks the
//! calling thread, [`BatchStream`] yields to the tokio timer.

use std::thread;

use futures::stream::Stream;

use stakeout_core::ChangeSet;

use crate::debounce::{DebouncedPoller, PollConfig, Step, StopFlag};
use crate::error::WatchError;
use crate::watcher::Watcher;

/// Watch on the current thread, yielding one debounced batch per iteration
pub fn watch<W: Watcher>(watcher: W, config: PollConfig) -> Batches<W> {
    Batches::new(watcher, config)
}

/// Watch without blocking, yielding batches from an async task
pub fn watch_async<W: Watcher>(watcher: W, config: PollConfig) -> BatchStream<W> {
    BatchStream::new(watcher, config)
}

/// Blocking iterator over debounced batches.
///
/// Iteration ends after the stop flag is observed or the watcher interrupts.
/// A fatal check error is yielded once as `Err`, then the iterator is fused.
pub struct Batches<W> {
    poller: DebouncedPoller<W>,
    finished: bool,
}

impl<W: Watcher> Batches<W> {
    pub fn new(watcher: W, config: PollConfig) -> Self {
        Self {
            poller: DebouncedPoller::new(watcher, config),
            finished: false,
        }
    }

    /// Attach a stop handle; `set()` on any clone ends the iteration
    pub fn with_stop(mut self, stop: StopFlag) -> Self {
        self.poller = self.poller.with_stop(stop);
        self
    }
}

impl<W: Watcher> Iterator for Batches<W> {
    type Item = Result<ChangeSet, WatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.poller.step() {
                Ok(Step::Sleep(duration)) => thread::sleep(duration),
                Ok(Step::Release(batch)) => return Some(Ok(batch)),
                Ok(Step::Stopped) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Async counterpart of [`Batches`], driven by `tokio::time`.
pub struct BatchStream<W> {
    poller: DebouncedPoller<W>,
    finished: bool,
}

impl<W: Watcher> BatchStream<W> {
    pub fn new(watcher: W, config: PollConfig) -> Self {
        Self {
            poller: DebouncedPoller::new(watcher, config),
            finished: false,
        }
    }

    pub fn with_stop(mut self, stop: StopFlag) -> Self {
        self.poller = self.poller.with_stop(stop);
        self
    }

    /// Next debounced batch, `None` once the loop has ended.
    ///
    /// Checks run inline on the current task; scans of very large trees
    /// belong on a blocking thread in the caller if that matters.
    pub async fn next(&mut self) -> Option<Result<ChangeSet, WatchError>> {
        if self.finished {
            return None;
        }
        loop {
            match self.poller.step() {
                Ok(Step::Sleep(duration)) => tokio::time::sleep(duration).await,
                Ok(Step::Release(batch)) => return Some(Ok(batch)),
                Ok(Step::Stopped) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }

    /// Adapt into a [`Stream`] for combinator-style consumers
    pub fn into_stream(self) -> impl Stream<Item = Result<ChangeSet, WatchError>> {
        futures::stream::unfold(self, |mut batches| async move {
            batches.next().await.map(|item| (item, batches))
        })
    }
}
