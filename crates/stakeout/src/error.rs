//! Poll loop errors

use thiserror::Error;

/// Failure modes of a watch loop
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watcher asked the loop to stop; not a failure
    #[error("watch interrupted")]
    Interrupted,

    /// A check failed in a way the loop cannot recover from
    #[error("watcher check failed: {0}")]
    Check(#[from] anyhow::Error),
}
