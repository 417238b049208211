use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use tracing::trace;

use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;

/// Bounded dispatcher for batch workers, plus the drain barrier.
///
/// Admission is a counting semaphore: a mutex-guarded active count with a
/// condvar. `dispatch` blocks the producer while the pool is saturated,
/// which is the engine's backpressure path; a slow matcher workload stalls
/// the scanner loop instead of growing an unbounded queue. Every worker
/// decrements the count and signals exactly once on completion, on every
/// path, so neither admission nor `drain` can stall behind a misbehaving
/// batch.
pub struct WorkerPool {
    pool: ThreadPool,
    max_workers: usize,
    slots: Arc<Slots>,
    metrics: ScanMetrics,
}

#[derive(Debug)]
struct Slots {
    active: Mutex<usize>,
    freed: Condvar,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases one worker slot when dropped, so the decrement and wake-up
/// happen even if the job unwinds.
struct SlotGuard {
    slots: Arc<Slots>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut active = self.slots.lock();
        *active -= 1;
        self.slots.freed.notify_one();
    }
}

impl WorkerPool {
    /// Builds a pool enforcing `max_workers` concurrent jobs.
    /// `max_workers` must be at least 1 (the config layer guarantees this).
    pub fn new(max_workers: usize, metrics: ScanMetrics) -> ScanResult<Self> {
        debug_assert!(max_workers >= 1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("tailgrep-worker-{i}"))
            .build()
            .map_err(|e| ScanError::worker_pool(e.to_string()))?;

        Ok(Self {
            pool,
            max_workers,
            slots: Arc::new(Slots {
                active: Mutex::new(0),
                freed: Condvar::new(),
            }),
            metrics,
        })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Currently running workers. Between 0 and `max_workers`.
    pub fn active_workers(&self) -> usize {
        *self.slots.lock()
    }

    /// Admits one job, blocking while the pool is saturated.
    ///
    /// The check of the active count and its increment happen under one
    /// lock, so two admissions can never both observe the last free slot.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut active = self.slots.lock();
            while *active >= self.max_workers {
                trace!("Pool saturated, waiting for a worker slot");
                active = self
                    .slots
                    .freed
                    .wait(active)
                    .unwrap_or_else(|e| e.into_inner());
            }
            *active += 1;
            self.metrics.record_active_workers(*active);
        }

        let guard = SlotGuard {
            slots: Arc::clone(&self.slots),
        };
        self.pool.spawn(move || {
            let _slot = guard;
            job();
        });
    }

    /// Blocks until every admitted worker has completed.
    ///
    /// Each completion signal is consumed by whichever phase is waiting,
    /// admission or drain; both re-check their predicate after waking, so a
    /// wake-up can never be lost to the wrong consumer.
    pub fn drain(&self) {
        let mut active = self.slots.lock();
        while *active > 0 {
            trace!("Draining, {} workers outstanding", *active);
            active = self
                .slots
                .freed
                .wait(active)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}
