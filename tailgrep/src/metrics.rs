use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::results::ScanSummary;

/// Shared run counters, updated from the scanner loop and the workers.
///
/// Clones share the same underlying counters. The totals are advisory while
/// workers are in flight; they are final and stable once the pool has
/// drained.
#[derive(Debug, Clone, Default)]
pub struct ScanMetrics {
    lines_scanned: Arc<AtomicU64>,
    total_matches: Arc<AtomicU64>,
    batches_dispatched: Arc<AtomicU64>,
    serialize_failures: Arc<AtomicU64>,
    peak_active_workers: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one line read by the scanner loop.
    pub fn record_line(&self) {
        self.lines_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one matched line. Called concurrently from workers.
    pub fn record_match(&self) {
        self.total_matches.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one batch handed to the dispatcher.
    pub fn record_batch(&self) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a record that could not be serialized.
    pub fn record_serialize_failure(&self) {
        self.serialize_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the active worker count observed at admission, keeping the
    /// high-water mark.
    pub fn record_active_workers(&self, active: usize) {
        let active = active as u64;
        let mut peak = self.peak_active_workers.load(Ordering::Relaxed);
        while active > peak {
            match self.peak_active_workers.compare_exchange_weak(
                peak,
                active,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
    }

    pub fn lines_scanned(&self) -> u64 {
        self.lines_scanned.load(Ordering::Relaxed)
    }

    pub fn total_matches(&self) -> u64 {
        self.total_matches.load(Ordering::Relaxed)
    }

    pub fn batches_dispatched(&self) -> u64 {
        self.batches_dispatched.load(Ordering::Relaxed)
    }

    pub fn serialize_failures(&self) -> u64 {
        self.serialize_failures.load(Ordering::Relaxed)
    }

    /// Highest concurrent worker count observed so far.
    pub fn peak_active_workers(&self) -> u64 {
        self.peak_active_workers.load(Ordering::Relaxed)
    }

    /// Snapshot of the totals. Only stable after the pool has drained.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            lines_scanned: self.lines_scanned(),
            total_matches: self.total_matches(),
            batches_dispatched: self.batches_dispatched(),
        }
    }
}
