//! Snapshot watcher: full rescan and diff per check
//!
//! [`TreeWatcher`] walks its root on every `check()`, builds a fresh
//! path -> mtime snapshot, and diffs it against the previous one. The full
//! rebuild is what makes deletions fall out for free: anything in the old
//! snapshot that the new walk did not produce is gone.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ahash::AHashMap;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use stakeout_core::{Change, ChangeSet, DefaultFilter, FilterConfig, FilterError, PathFilter};

use crate::error::WatchError;

/// A source of change sets for the poll loop.
///
/// The stock implementation is [`TreeWatcher`]; the trait is the seam for
/// alternative backends and for scripted watchers in scheduling tests.
pub trait Watcher {
    /// Rescan and report everything that changed since the previous call.
    ///
    /// Returning [`WatchError::Interrupted`] asks the poll loop to stop
    /// cleanly; any other error is fatal to the loop.
    fn check(&mut self) -> Result<ChangeSet, WatchError>;

    /// Root being watched, for diagnostics
    fn root(&self) -> &Path;

    /// Number of paths in the current snapshot, for diagnostics
    fn file_count(&self) -> usize {
        0
    }
}

/// Stat-polling watcher over one directory tree.
///
/// Construction performs the baseline walk immediately, so the first
/// `check()` only reports activity that happened after construction. A
/// missing root is not an error: the snapshot stays empty, a diagnostic is
/// logged, and a root created later is picked up on a subsequent check.
pub struct TreeWatcher<F = DefaultFilter> {
    root: PathBuf,
    filter: F,
    files: AHashMap<PathBuf, SystemTime>,
}

impl TreeWatcher<DefaultFilter> {
    /// Watch `root` with the built-in denylist filter
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_filter(root, DefaultFilter::new())
    }
}

impl TreeWatcher<Box<dyn PathFilter + Send + Sync>> {
    /// Watch `root` with the filter described by `config`.
    ///
    /// Fails if the configuration holds a malformed pattern.
    pub fn from_config(
        root: impl Into<PathBuf>,
        config: &FilterConfig,
    ) -> Result<Self, FilterError> {
        Ok(Self::with_filter(root, config.build()?))
    }
}

impl<F: PathFilter> TreeWatcher<F> {
    /// Watch `root` with `filter`
    pub fn with_filter(root: impl Into<PathBuf>, filter: F) -> Self {
        let mut watcher = Self {
            root: root.into(),
            filter,
            files: AHashMap::new(),
        };
        // Baseline snapshot; the diff against the empty map is discarded
        watcher.rescan();
        watcher
    }

    /// Walk the tree into a fresh snapshot and diff it against the stored one
    fn rescan(&mut self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        let mut seen: AHashMap<PathBuf, SystemTime> = AHashMap::with_capacity(self.files.len());

        let filter = &self.filter;
        let walk = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            // The root itself is never filtered; only children are judged
            .filter_entry(|entry| entry.depth() == 0 || accepts(filter, entry));

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        // Root missing or unreadable: empty snapshot, keep watching
                        warn!("error walking file system: {}", err);
                    } else {
                        debug!("skipping unreadable path: {}", err);
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            // A file vanishing between readdir and stat counts as absent
            let modified = match entry.metadata() {
                Ok(meta) => match meta.modified() {
                    Ok(modified) => modified,
                    Err(err) => {
                        debug!("skipping {}: {}", entry.path().display(), err);
                        continue;
                    }
                },
                Err(err) => {
                    debug!("skipping {}: {}", entry.path().display(), err);
                    continue;
                }
            };

            let path = entry.into_path();
            match self.files.get(&path) {
                None => {
                    changes.insert((Change::Added, path.clone()));
                }
                // Exact token comparison, no tolerance window
                Some(prev) if *prev != modified => {
                    changes.insert((Change::Modified, path.clone()));
                }
                Some(_) => {}
            }
            seen.insert(path, modified);
        }

        for path in self.files.keys() {
            if !seen.contains_key(path) {
                changes.insert((Change::Deleted, path.clone()));
            }
        }

        self.files = seen;
        changes
    }
}

impl<F: PathFilter> Watcher for TreeWatcher<F> {
    fn check(&mut self) -> Result<ChangeSet, WatchError> {
        Ok(self.rescan())
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Dispatch an entry to the right filter predicate
fn accepts<F: PathFilter>(filter: &F, entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        filter.should_include_dir(entry.path())
    } else {
        filter.should_include_file(entry.path())
    }
}
