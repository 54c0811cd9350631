//! Commit scheduling
//!
//! All snapshot writes for a database go through one [`CommitScheduler`]:
//! - `commit_sync`: write on the caller's thread and return the result
//! - `commit_async`: hand the bytes to the background writer and return
//!
//! # Design
//!
//! - One worker thread, one pending slot. A newer async commit replaces an
//!   older one that has not started yet; listeners of both are notified
//!   when the surviving write finishes.
//! - Every commit gets a sequence number when it is scheduled. The writer
//!   lock skips any commit older than the last one written, so overlapping
//!   commits collapse to last-writer-wins and file writes never interleave.
//! - Callers encode the store before scheduling; the worker never touches
//!   live data.
//!
//! Failures of fire-and-forget commits are only visible in the log.

use crate::snapshot::SnapshotFile;
use parking_lot::{Condvar, Mutex};
use snapdb_core::{Error, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Receives the outcome of an asynchronous commit
///
/// Closures taking `Result<(), &Error>` implement this trait:
///
/// ```ignore
/// db.commit_async_with(|outcome: Result<(), &Error>| {
///     if let Err(e) = outcome {
///         eprintln!("commit failed: {}", e);
///     }
/// });
/// ```
pub trait CommitListener: Send + 'static {
    /// The snapshot (or a newer one that supersedes it) was written
    fn on_complete(&self);

    /// Writing the snapshot failed
    fn on_failed(&self, error: &Error);
}

impl<F> CommitListener for F
where
    F: Fn(std::result::Result<(), &Error>) + Send + 'static,
{
    fn on_complete(&self) {
        self(Ok(()))
    }

    fn on_failed(&self, error: &Error) {
        self(Err(error))
    }
}

/// Commit counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Async commits handed to the scheduler
    pub scheduled: u64,
    /// Snapshots actually written (sync and async)
    pub written: u64,
    /// Commits skipped because a newer snapshot replaced them
    pub superseded: u64,
    /// Commits that failed with an I/O error (sync and async)
    pub failed: u64,
}

struct Writer {
    file: SnapshotFile,
    last_written: u64,
}

struct PendingCommit {
    seq: u64,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Queue {
    pending: Option<PendingCommit>,
    listeners: Vec<Box<dyn CommitListener>>,
    in_flight: bool,
    shutdown: bool,
}

struct Shared {
    writer: Mutex<Writer>,
    queue: Mutex<Queue>,
    wake: Condvar,
    idle: Condvar,
    next_seq: AtomicU64,
    stats: Mutex<CommitStats>,
}

impl Shared {
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Write `bytes` unless a newer commit already reached the file
    ///
    /// Returns `Ok(false)` when the commit was superseded.
    fn write(&self, seq: u64, bytes: &[u8]) -> Result<bool> {
        let mut writer = self.writer.lock();
        if seq <= writer.last_written {
            self.stats.lock().superseded += 1;
            return Ok(false);
        }
        match writer.file.save(bytes) {
            Ok(()) => {
                writer.last_written = seq;
                self.stats.lock().written += 1;
                Ok(true)
            }
            Err(e) => {
                self.stats.lock().failed += 1;
                Err(e)
            }
        }
    }
}

/// Single-writer commit actor for one snapshot file
pub struct CommitScheduler {
    shared: Arc<Shared>,
    path: PathBuf,
    worker: Option<JoinHandle<()>>,
}

impl CommitScheduler {
    /// Start the background writer for `file`
    pub fn start(file: SnapshotFile) -> Result<Self> {
        let path = file.path().to_path_buf();
        let shared = Arc::new(Shared {
            writer: Mutex::new(Writer {
                file,
                last_written: 0,
            }),
            queue: Mutex::new(Queue::default()),
            wake: Condvar::new(),
            idle: Condvar::new(),
            next_seq: AtomicU64::new(0),
            stats: Mutex::new(CommitStats::default()),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("snapdb-commit".into())
            .spawn(move || run_worker(worker_shared))?;

        Ok(Self {
            shared,
            path,
            worker: Some(worker),
        })
    }

    /// Path of the snapshot this scheduler writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `bytes` now, blocking until the file is replaced
    ///
    /// Waits for any write already in progress. Fails with
    /// [`Error::CommitFailure`] on I/O error.
    pub fn commit_sync(&self, bytes: Vec<u8>) -> Result<()> {
        let seq = self.shared.next_seq();
        self.shared.write(seq, &bytes).map(|_| ())
    }

    /// Schedule `bytes` for the background writer
    ///
    /// Returns immediately. `listener`, if any, is told the outcome.
    pub fn commit_async(&self, bytes: Vec<u8>, listener: Option<Box<dyn CommitListener>>) {
        let seq = self.shared.next_seq();
        let mut queue = self.shared.queue.lock();
        if queue.pending.replace(PendingCommit { seq, bytes }).is_some() {
            self.shared.stats.lock().superseded += 1;
            tracing::trace!(target: "snapdb::commit", seq, "Pending commit replaced by a newer one");
        }
        if let Some(listener) = listener {
            queue.listeners.push(listener);
        }
        self.shared.stats.lock().scheduled += 1;
        self.shared.wake.notify_one();
    }

    /// Block until no async commit is pending or being written
    pub fn wait_idle(&self) {
        let mut queue = self.shared.queue.lock();
        while queue.pending.is_some() || queue.in_flight {
            self.shared.idle.wait(&mut queue);
        }
    }

    /// Snapshot of the commit counters
    pub fn stats(&self) -> CommitStats {
        *self.shared.stats.lock()
    }
}

impl Drop for CommitScheduler {
    fn drop(&mut self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.shutdown = true;
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(target: "snapdb::commit", "Commit worker panicked");
            }
        }
    }
}

fn run_worker(shared: Arc<Shared>) {
    loop {
        let (commit, listeners) = {
            let mut queue = shared.queue.lock();
            while queue.pending.is_none() && !queue.shutdown {
                shared.wake.wait(&mut queue);
            }
            match queue.pending.take() {
                Some(commit) => {
                    queue.in_flight = true;
                    (commit, std::mem::take(&mut queue.listeners))
                }
                // shutdown with nothing left to write
                None => return,
            }
        };

        let result = shared.write(commit.seq, &commit.bytes);
        match &result {
            Ok(true) => {
                tracing::debug!(target: "snapdb::commit", seq = commit.seq, bytes = commit.bytes.len(), "Async commit written")
            }
            Ok(false) => {
                tracing::debug!(target: "snapdb::commit", seq = commit.seq, "Async commit superseded by a newer snapshot")
            }
            Err(e) => {
                tracing::error!(target: "snapdb::commit", seq = commit.seq, error = %e, "Async commit failed")
            }
        }

        for listener in &listeners {
            let notified = catch_unwind(AssertUnwindSafe(|| match &result {
                Ok(_) => listener.on_complete(),
                Err(e) => listener.on_failed(e),
            }));
            if notified.is_err() {
                tracing::warn!(target: "snapdb::commit", seq = commit.seq, "Commit listener panicked");
            }
        }

        let mut queue = shared.queue.lock();
        queue.in_flight = false;
        shared.idle.notify_all();
    }
}
