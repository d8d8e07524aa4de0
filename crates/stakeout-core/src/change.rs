//! Change model shared by watchers and the poll loop

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Kind of change observed for one path between two scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// Path present now, absent in the previous snapshot
    Added,
    /// Path present in both snapshots with a different modification time
    Modified,
    /// Path absent now, present in the previous snapshot
    Deleted,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Change::Added => "added",
            Change::Modified => "modified",
            Change::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Output unit of one `check()` call: deduplicated (kind, path) records.
///
/// Also the shape of a released batch, which is the union of every
/// non-empty check result inside one debounce window.
pub type ChangeSet = HashSet<(Change, PathBuf)>;
