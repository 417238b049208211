//! The buffering + bounded-concurrency scan engine.
//!
//! Data flow: file -> scanner loop -> batch -> dispatcher -> worker ->
//! matcher -> counters and emitted records. The scanner loop is the sole
//! producer; the pool mediates admission and the drain barrier guarantees
//! final counts are exact before they are reported.

pub mod batch;
pub mod matcher;
pub mod pool;
pub mod processor;
pub mod reader;
pub mod sink;

use std::fs::File;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::ScanSummary;
use batch::Batch;
use matcher::Matcher;
use pool::WorkerPool;
use processor::BatchProcessor;
use reader::TailReader;
use sink::{MatchSink, StdoutSink};

/// Runs a scan with records going to stdout and no external cancellation.
///
/// In follow mode this never returns on its own; callers that need to stop
/// a follow-mode scan should use [`scan_with`] and cancel the token.
pub fn scan(config: &ScanConfig) -> ScanResult<ScanSummary> {
    scan_with(config, Arc::new(StdoutSink), CancelToken::new())
}

/// Runs a scan to completion and returns the final, stable totals.
///
/// Single-pass mode ends at end-of-input; follow mode rescans from the
/// current offset after each poll interval until `cancel` fires. Either
/// way the worker pool is fully drained before the summary is read, so the
/// returned counts cannot race an in-flight worker.
///
/// # Errors
///
/// Only startup failures are returned: an invalid regex, an unopenable
/// source, or a pool that cannot be built. Once scanning begins, per-line
/// and per-record failures are contained and logged.
pub fn scan_with(
    config: &ScanConfig,
    sink: Arc<dyn MatchSink>,
    cancel: CancelToken,
) -> ScanResult<ScanSummary> {
    info!(
        "Starting scan of {} for {:?} ({} mode)",
        config.path.display(),
        config.query,
        if config.is_regex { "regex" } else { "literal" }
    );

    // Fail fast on a bad pattern, before the file is touched
    let matcher = Matcher::new(&config.query, config.is_regex)?;

    let file = File::open(&config.path).map_err(|e| ScanError::from_io(&config.path, e))?;
    let mut reader = TailReader::new(file, config.follow);

    let metrics = ScanMetrics::new();
    let pool = WorkerPool::new(config.effective_workers(), metrics.clone())?;
    let processor = Arc::new(BatchProcessor::new(config, matcher, sink, metrics.clone()));

    let capacity = config.effective_batch_capacity();
    let mut line_number: u64 = 0;
    let mut batch = Batch::new(capacity);

    loop {
        // Drain whatever the file currently holds
        loop {
            match reader.next_line() {
                Ok(Some(text)) => {
                    line_number += 1;
                    metrics.record_line();
                    batch.push(line_number, text);
                    if batch.is_full() {
                        let full = std::mem::replace(&mut batch, Batch::new(capacity));
                        flush(&pool, &processor, &metrics, full);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // Mid-scan read errors never abort the run. Follow mode
                    // treats this cycle as empty and retries after the delay.
                    warn!(
                        "Read error at offset {}: {e}{}",
                        reader.position(),
                        if config.follow {
                            ", retrying next cycle"
                        } else {
                            ", stopping scan"
                        }
                    );
                    break;
                }
            }
        }

        // A partial batch is still a batch
        if !batch.is_empty() {
            debug!("Flushing partial batch of {} lines", batch.len());
            let partial = std::mem::replace(&mut batch, Batch::new(capacity));
            flush(&pool, &processor, &metrics, partial);
        }

        if !config.follow || cancel.is_cancelled() {
            break;
        }
        if cancel.wait_timeout(config.poll_interval) {
            break;
        }
    }

    pool.drain();

    let summary = metrics.summary();
    info!(
        "Scan complete: {} lines, {} matches in {} batches",
        summary.lines_scanned, summary.total_matches, summary.batches_dispatched
    );
    Ok(summary)
}

/// Hands a batch to the pool. Ownership moves to exactly one worker.
fn flush(
    pool: &WorkerPool,
    processor: &Arc<BatchProcessor>,
    metrics: &ScanMetrics,
    batch: Batch,
) {
    metrics.record_batch();
    let processor = Arc::clone(processor);
    pool.dispatch(move || processor.process(batch));
}
