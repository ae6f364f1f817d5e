//! Vanity mint addresses.
//!
//! Worker threads generate keypairs until a base58 address ends with the
//! requested suffix (case-insensitive). The first match wins and the other
//! workers stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use solana_sdk::signature::{Keypair, Signer};

pub use crate::adapters::solana::{decode_keypair, encode_keypair};
use crate::domain::constants::PLATFORM_SUFFIX;

/// Keypairs generated between checks of the stop flag
const BATCH_SIZE: u64 = 256;

/// Case-insensitive suffix match on a base58 address
pub fn matches_suffix(address: &str, suffix: &str) -> bool {
    address.len() >= suffix.len()
        && address
            .get(address.len() - suffix.len()..)
            .map(|tail| tail.eq_ignore_ascii_case(suffix))
            .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct VanityConfig {
    pub suffix: String,
    pub threads: usize,
    pub timeout: Duration,
    /// Stop after this many keypairs across all workers
    pub max_attempts: Option<u64>,
}

impl Default for VanityConfig {
    fn default() -> Self {
        Self {
            suffix: PLATFORM_SUFFIX.to_string(),
            threads: num_cpus::get().max(1),
            timeout: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

/// Result of a grinding run
#[derive(Debug)]
pub struct VanityOutcome {
    pub keypair: Option<Keypair>,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl VanityOutcome {
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// Running workers; stopped and joined on drop
struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    result_rx: Receiver<Keypair>,
    stop_flag: Arc<AtomicBool>,
    attempts: Arc<AtomicU64>,
}

impl WorkerPool {
    fn spawn(config: &VanityConfig) -> std::io::Result<Self> {
        let (result_tx, result_rx) = bounded(1);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let attempts = Arc::new(AtomicU64::new(0));

        let mut pool = Self {
            handles: Vec::with_capacity(config.threads),
            result_rx,
            stop_flag,
            attempts,
        };

        for id in 0..config.threads.max(1) {
            let worker = Worker {
                suffix: config.suffix.clone(),
                max_attempts: config.max_attempts,
                result_tx: result_tx.clone(),
                stop_flag: Arc::clone(&pool.stop_flag),
                attempts: Arc::clone(&pool.attempts),
            };
            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run())?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

struct Worker {
    suffix: String,
    max_attempts: Option<u64>,
    result_tx: Sender<Keypair>,
    stop_flag: Arc<AtomicBool>,
    attempts: Arc<AtomicU64>,
}

impl Worker {
    fn run(self) {
        while !self.stop_flag.load(Ordering::Relaxed) {
            for _ in 0..BATCH_SIZE {
                let keypair = Keypair::new();
                if matches_suffix(&keypair.pubkey().to_string(), &self.suffix) {
                    self.attempts.fetch_add(1, Ordering::Relaxed);
                    // The keypair must be queued before other threads see the stop
                    let _ = self.result_tx.try_send(keypair);
                    self.stop_flag.store(true, Ordering::Release);
                    return;
                }
            }

            let total = self.attempts.fetch_add(BATCH_SIZE, Ordering::Relaxed) + BATCH_SIZE;
            if self.max_attempts.is_some_and(|max| total >= max) {
                self.stop_flag.store(true, Ordering::Release);
                return;
            }
        }
    }
}

pub struct VanityGrinder {
    config: VanityConfig,
}

impl VanityGrinder {
    pub fn new(config: VanityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VanityConfig {
        &self.config
    }

    /// Grind on worker threads, blocking until a match, the timeout or the
    /// attempt budget
    pub fn grind(&self) -> std::io::Result<VanityOutcome> {
        let start = Instant::now();
        tracing::info!(
            suffix = %self.config.suffix,
            threads = self.config.threads,
            timeout_secs = self.config.timeout.as_secs(),
            "Grinding vanity address"
        );

        let pool = WorkerPool::spawn(&self.config)?;
        let deadline = start + self.config.timeout;
        let mut keypair = None;

        // Poll so an exhausted attempt budget ends the wait early
        while Instant::now() < deadline {
            let wait = deadline
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(100));
            if let Ok(found) = pool.result_rx.recv_timeout(wait) {
                keypair = Some(found);
                break;
            }
            if pool.stop_flag.load(Ordering::Acquire) {
                keypair = pool.result_rx.try_recv().ok();
                break;
            }
        }

        pool.stop();
        let attempts = pool.attempts.load(Ordering::Relaxed);
        drop(pool);

        let outcome = VanityOutcome {
            keypair,
            attempts,
            elapsed: start.elapsed(),
        };

        match &outcome.keypair {
            Some(kp) => tracing::info!(
                address = %kp.pubkey(),
                attempts = outcome.attempts,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Found vanity address"
            ),
            None => tracing::warn!(
                suffix = %self.config.suffix,
                attempts = outcome.attempts,
                "No vanity address found"
            ),
        }

        Ok(outcome)
    }

    /// Grind on the blocking pool, falling back to a random keypair
    pub async fn grind_or_random(&self) -> Keypair {
        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || VanityGrinder::new(config).grind()).await;

        match result {
            Ok(Ok(VanityOutcome {
                keypair: Some(keypair),
                ..
            })) => keypair,
            Ok(Ok(_)) => Keypair::new(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to start vanity workers");
                Keypair::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vanity task failed");
                Keypair::new()
            }
        }
    }
}
