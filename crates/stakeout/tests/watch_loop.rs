//! End-to-end tests for the blocking and async watch drivers

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use futures::StreamExt;
use tempfile::TempDir;

use stakeout::{
    watch, watch_async, Change, ChangeSet, PollConfig, StopFlag, TreeWatcher, WatchError, Watcher,
};

/// Replays a fixed sequence of check results, then interrupts
struct ScriptedWatcher {
    root: PathBuf,
    script: VecDeque<Result<ChangeSet, WatchError>>,
}

impl ScriptedWatcher {
    fn new(script: Vec<Result<ChangeSet, WatchError>>) -> Self {
        Self {
            root: PathBuf::from("/scripted"),
            script: script.into(),
        }
    }
}

impl Watcher for ScriptedWatcher {
    fn check(&mut self) -> Result<ChangeSet, WatchError> {
        self.script
            .pop_front()
            .unwrap_or(Err(WatchError::Interrupted))
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Reports a never-seen-before path on every poll, so the tree never quiesces
struct BusyWatcher {
    root: PathBuf,
    polls: usize,
}

impl BusyWatcher {
    fn new() -> Self {
        Self {
            root: PathBuf::from("/busy"),
            polls: 0,
        }
    }
}

impl Watcher for BusyWatcher {
    fn check(&mut self) -> Result<ChangeSet, WatchError> {
        self.polls += 1;
        let path = PathBuf::from(format!("burst-{}", self.polls));
        Ok([(Change::Added, path)].into_iter().collect())
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

fn record(name: &str) -> ChangeSet {
    [(Change::Added, PathBuf::from(name))].into_iter().collect()
}

fn empty() -> ChangeSet {
    ChangeSet::new()
}

/// Debounce far enough out that only quiet polls and stops end a burst
fn quiesce_config() -> PollConfig {
    PollConfig {
        debounce: Duration::from_secs(3600),
        normal_sleep: Duration::from_millis(2),
        min_sleep: Duration::from_millis(1),
    }
}

#[test]
fn test_batches_arrive_in_burst_order() {
    let watcher = ScriptedWatcher::new(vec![
        Ok(record("r1")),
        Ok(empty()),
        Ok(record("r2")),
        Ok(empty()),
    ]);

    let batches: Vec<_> = watch(watcher, quiesce_config())
        .map(Result::unwrap)
        .collect();
    assert_eq!(batches, vec![record("r1"), record("r2")]);
}

#[test]
fn test_stop_set_before_start_yields_nothing() {
    // Any poll would surface this error, so an empty run proves no poll ran
    let watcher = ScriptedWatcher::new(vec![Err(WatchError::Check(anyhow::anyhow!("polled")))]);
    let stop = StopFlag::new();
    stop.set();

    let mut batches = watch(watcher, quiesce_config()).with_stop(stop);
    assert!(batches.next().is_none());
}

#[test]
fn test_interrupt_ends_iteration_without_error() {
    let watcher = ScriptedWatcher::new(vec![Ok(record("r1")), Ok(empty())]);
    let mut batches = watch(watcher, quiesce_config());

    assert_eq!(batches.next().unwrap().unwrap(), record("r1"));
    assert!(batches.next().is_none());
    assert!(batches.next().is_none());
}

#[test]
fn test_fatal_error_is_yielded_once_then_fused() {
    let watcher = ScriptedWatcher::new(vec![Err(WatchError::Check(anyhow::anyhow!("boom")))]);
    let mut batches = watch(watcher, quiesce_config());

    assert!(matches!(batches.next(), Some(Err(WatchError::Check(_)))));
    assert!(batches.next().is_none());
}

#[test]
fn test_deadline_releases_under_continuous_change() {
    let config = PollConfig {
        debounce: Duration::from_millis(40),
        normal_sleep: Duration::from_millis(2),
        min_sleep: Duration::from_millis(1),
    };
    let mut batches = watch(BusyWatcher::new(), config);

    let started = Instant::now();
    let batch = batches.next().unwrap().unwrap();

    assert!(started.elapsed() >= config.debounce);
    // Several polls fit inside the debounce window
    assert!(batch.len() >= 2, "expected a coalesced burst, got {:?}", batch);
}

#[test]
fn test_stop_interrupts_endless_burst() {
    let stop = StopFlag::new();
    let mut batches = watch(BusyWatcher::new(), quiesce_config()).with_stop(stop.clone());

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        stop.set();
    });

    assert!(batches.next().is_none());
    stopper.join().unwrap();
}

#[test]
fn test_watch_reports_filesystem_writes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let config = PollConfig {
        debounce: Duration::from_millis(200),
        normal_sleep: Duration::from_millis(50),
        min_sleep: Duration::from_millis(10),
    };

    let stop = StopFlag::new();
    let batches = watch(TreeWatcher::new(&root), config).with_stop(stop.clone());
    let (tx, rx) = bounded(4);
    let worker = thread::spawn(move || {
        for batch in batches {
            if tx.send(batch).is_err() {
                break;
            }
        }
    });

    fs::write(root.join("fresh.txt"), b"hello").unwrap();

    let batch = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(batch.contains(&(Change::Added, root.join("fresh.txt"))));

    stop.set();
    worker.join().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_async_stream_releases_after_quiet_poll() {
    let watcher = ScriptedWatcher::new(vec![
        Ok(empty()),
        Ok(empty()),
        Ok(record("r1")),
        Ok(empty()),
    ]);
    let mut stream = watch_async(watcher, quiesce_config());

    assert_eq!(stream.next().await.unwrap().unwrap(), record("r1"));
    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_async_stop_set_before_start_yields_nothing() {
    let watcher = ScriptedWatcher::new(vec![Err(WatchError::Check(anyhow::anyhow!("polled")))]);
    let stop = StopFlag::new();
    stop.set();

    let mut stream = watch_async(watcher, quiesce_config()).with_stop(stop);
    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_async_watch_reports_filesystem_writes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();

    let watcher = TreeWatcher::new(&root);
    fs::write(root.join("fresh.txt"), b"hello").unwrap();

    let mut stream = watch_async(watcher, quiesce_config());
    let batch = stream.next().await.unwrap().unwrap();
    assert!(batch.contains(&(Change::Added, root.join("fresh.txt"))));
}

#[tokio::test(start_paused = true)]
async fn test_into_stream_adapter() {
    let watcher = ScriptedWatcher::new(vec![Ok(record("r1")), Ok(empty())]);
    let stream = watch_async(watcher, quiesce_config()).into_stream();

    let batches: Vec<_> = stream.collect().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].as_ref().unwrap(), &record("r1"));
}
