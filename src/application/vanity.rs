//! Vanity Mint Search
//!
//! Brute-forces keypairs on a dedicated rayon pool until one's base58 address
//! ends with the requested suffix. Workers test keys in fixed-size batches and
//! only look at the shared cancel flag between batches.
//!
//! The first worker to flip the cancel flag owns the result. Its reported
//! attempt count is its own local count, which undercounts the work done
//! across all workers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use solana_sdk::signature::{Keypair, Signer};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::mint::MintIdentity;

/// Upper bound on worker threads
pub const MAX_WORKERS: usize = 6;

/// Keys generated between cancel-flag checks
pub const SEARCH_BATCH_SIZE: u64 = 10_000;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VanityError {
    #[error("Suffix '{suffix}' contains '{invalid}', which never appears in a base58 address")]
    InvalidSuffix { suffix: String, invalid: char },

    #[error("Search canceled")]
    SearchCanceled,

    #[error("Search already running")]
    SearchAlreadyRunning,

    #[error("All {0} workers stopped without a match")]
    WorkersFailed(usize),

    #[error("Failed to start workers: {0}")]
    Spawn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VanityConfig {
    pub max_workers: usize,
    pub batch_size: u64,
}

impl Default for VanityConfig {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
            batch_size: SEARCH_BATCH_SIZE,
        }
    }
}

impl VanityConfig {
    /// min(max_workers, available parallelism), at least one
    pub fn worker_count(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.max_workers.min(available).max(1)
    }
}

/// One completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub attempts_this_report: u64,
}

/// Winning keypair
#[derive(Debug)]
pub struct VanityMatch {
    pub mint: MintIdentity,
    /// Winning worker's own count
    pub attempts: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Per-worker result
#[derive(Debug)]
enum WorkerEvent {
    Progress(u64),
    Found { keypair: Keypair, local_attempts: u64 },
}

/// Decrements the active-worker count when a worker exits, panics included
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn validate_suffix(suffix: &str) -> Result<(), VanityError> {
    match suffix.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        Some(invalid) => Err(VanityError::InvalidSuffix {
            suffix: suffix.to_string(),
            invalid,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
pub struct VanitySearch {
    config: VanityConfig,
    /// Cancel flag of the search in flight, if any
    current: Mutex<Option<Arc<AtomicBool>>>,
    active: Arc<AtomicUsize>,
}

impl VanitySearch {
    pub fn new(config: VanityConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &VanityConfig {
        &self.config
    }

    /// Workers still searching
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }

    /// Cancel the search in flight; workers exit at their next batch boundary
    pub fn stop(&self) {
        if let Some(flag) = self.slot().as_ref() {
            flag.store(true, Ordering::SeqCst);
            tracing::info!("Vanity search stop requested");
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<AtomicBool>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Search for an address ending with `suffix` (case-sensitive)
    ///
    /// `on_progress` receives one increment per completed batch. Returns once
    /// every worker has exited.
    pub async fn search<F>(&self, suffix: &str, mut on_progress: F) -> Result<VanityMatch, VanityError>
    where
        F: FnMut(SearchProgress),
    {
        validate_suffix(suffix)?;

        let cancel = Arc::new(AtomicBool::new(false));
        {
            let mut slot = self.slot();
            if let Some(running) = slot.as_ref() {
                running.store(true, Ordering::SeqCst);
                tracing::warn!("Vanity search already running; canceling it");
                return Err(VanityError::SearchAlreadyRunning);
            }
            *slot = Some(Arc::clone(&cancel));
        }

        let started = Instant::now();
        let workers = self.config.worker_count();
        let pool = match worker_pool(workers) {
            Ok(pool) => pool,
            Err(e) => {
                self.release(&cancel);
                return Err(e);
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        for _ in 0..workers {
            self.active.fetch_add(1, Ordering::SeqCst);
            let worker = Worker {
                _active: ActiveGuard(Arc::clone(&self.active)),
                suffix: suffix.to_string(),
                batch_size: self.config.batch_size.max(1),
                cancel: Arc::clone(&cancel),
                events: tx.clone(),
            };
            pool.spawn(move || worker.run());
        }
        drop(tx);

        tracing::info!(suffix, workers, "Vanity search started");

        let mut found = None;
        while let Some(event) = rx.recv().await {
            match event {
                // a stopped search reports nothing further
                WorkerEvent::Progress(_) if cancel.load(Ordering::SeqCst) => {}
                WorkerEvent::Progress(n) => on_progress(SearchProgress {
                    attempts_this_report: n,
                }),
                WorkerEvent::Found {
                    keypair,
                    local_attempts,
                } => found = Some((keypair, local_attempts)),
            }
        }

        // channel closed: every worker has dropped its guard and sender
        drop(pool);
        let canceled = cancel.load(Ordering::SeqCst);
        self.release(&cancel);

        match found {
            Some((keypair, attempts)) => {
                let mint = MintIdentity::new(keypair);
                tracing::info!(
                    address = %mint.address(),
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    outcome = "success",
                    "Vanity address found"
                );
                Ok(VanityMatch {
                    mint,
                    attempts,
                    workers,
                    elapsed: started.elapsed(),
                })
            }
            None if canceled => {
                tracing::info!("Vanity search canceled");
                Err(VanityError::SearchCanceled)
            }
            None => {
                tracing::error!(workers, "Vanity workers stopped without a match");
                Err(VanityError::WorkersFailed(workers))
            }
        }
    }

    /// Clear the running slot if it still holds this search
    fn release(&self, cancel: &Arc<AtomicBool>) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|c| Arc::ptr_eq(c, cancel)) {
            *slot = None;
        }
    }
}

/// Pool for one search; a panicking worker is logged, not fatal
fn worker_pool(workers: usize) -> Result<rayon::ThreadPool, VanityError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("vanity-{}", i))
        .panic_handler(|_| tracing::error!("Vanity worker panicked"))
        .build()
        .map_err(|e| VanityError::Spawn(e.to_string()))
}

/// Fields drop in order, so the guard is released before the sender closes
struct Worker {
    _active: ActiveGuard,
    suffix: String,
    batch_size: u64,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

impl Worker {
    fn run(self) {
        let mut local_attempts = 0u64;

        while !self.cancel.load(Ordering::SeqCst) {
            for _ in 0..self.batch_size {
                let keypair = Keypair::new();
                local_attempts += 1;

                if keypair.pubkey().to_string().ends_with(&self.suffix) {
                    // first to flip the flag wins; a prior stop() also wins over us
                    if !self.cancel.swap(true, Ordering::SeqCst) {
                        let _ = self.events.send(WorkerEvent::Found {
                            keypair,
                            local_attempts,
                        });
                    }
                    return;
                }
            }

            // a batch interrupted by stop() is discarded
            if self.cancel.load(Ordering::SeqCst) {
                return;
            }
            if self.events.send(WorkerEvent::Progress(self.batch_size)).is_err() {
                return;
            }
        }
    }
}

/// Caller-side progress throttle
///
/// Accumulates batch increments and logs at most once per interval.
#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    started: Instant,
    last_report: Instant,
    total: u64,
    since_report: u64,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            started: now,
            last_report: now,
            total: 0,
            since_report: 0,
        }
    }

    /// Total attempts reported so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Record an increment; returns true when a log line was emitted
    pub fn record(&mut self, progress: SearchProgress) -> bool {
        self.total += progress.attempts_this_report;
        self.since_report += progress.attempts_this_report;

        let now = Instant::now();
        let window = now.duration_since(self.last_report);
        if window < self.interval {
            return false;
        }

        let rate = self.since_report as f64 / window.as_secs_f64().max(f64::EPSILON);
        tracing::info!(
            attempts = self.total,
            rate = rate as u64,
            elapsed_s = self.started.elapsed().as_secs(),
            "Searched {} keys ({:.0}/s)",
            self.total,
            rate
        );
        self.last_report = now;
        self.since_report = 0;
        true
    }
}
