//! Stat-polling file watcher with debounced batches
//!
//! Handles:
//! - Snapshot scans and mtime diffing over a directory tree
//! - Debounced accumulation of changes with a release deadline
//! - Blocking iterator and async stream drivers over one scheduling core
//! - Filter strategies from `stakeout-core` (denylist, Python project, regex)
//!
//! The usual entry points are [`watch`] and [`watch_async`] over a
//! [`TreeWatcher`]; [`DebouncedPoller`] is public for callers that bring
//! their own waiting.

pub mod debounce;
pub mod error;
pub mod watch;
pub mod watcher;

pub use debounce::{DebouncedPoller, PollConfig, Step, StopFlag};
pub use error::WatchError;
pub use watch::{watch, watch_async, BatchStream, Batches};
pub use watcher::{TreeWatcher, Watcher};

pub use stakeout_core::{
    AcceptAll, Change, ChangeSet, DefaultFilter, FilterConfig, FilterError, PathFilter,
    PythonFilter, RegexFilter,
};
