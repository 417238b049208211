use std::sync::Arc;
use tracing::{debug, warn};

use super::batch::Batch;
use super::matcher::Matcher;
use super::sink::MatchSink;
use crate::config::ScanConfig;
use crate::metrics::ScanMetrics;
use crate::results::MatchRecord;

/// The worker body: applies the matcher to every line of one batch.
///
/// Line order within a batch carries no meaning here, and batches complete
/// in no particular order across workers; match counting is commutative so
/// neither affects the totals. All per-line and per-record failures are
/// contained in this type.
pub struct BatchProcessor {
    matcher: Matcher,
    host: String,
    filename: String,
    query: String,
    emit_records: bool,
    sink: Arc<dyn MatchSink>,
    metrics: ScanMetrics,
}

impl BatchProcessor {
    pub fn new(
        config: &ScanConfig,
        matcher: Matcher,
        sink: Arc<dyn MatchSink>,
        metrics: ScanMetrics,
    ) -> Self {
        Self {
            matcher,
            host: config.host.clone(),
            filename: config.path.display().to_string(),
            query: config.query.clone(),
            emit_records: config.emit_records,
            sink,
            metrics,
        }
    }

    /// Processes one batch to completion. Never fails; a bad record is
    /// logged and skipped so the rest of the batch still counts.
    pub fn process(&self, batch: Batch) {
        for (line_number, text) in batch.into_lines() {
            if !self.matcher.is_match(&text) {
                continue;
            }

            debug!(line_number, "Matched line");
            self.metrics.record_match();

            if !self.emit_records {
                continue;
            }

            let record =
                MatchRecord::new(&self.host, &self.filename, &self.query, line_number, &text);
            match serde_json::to_string(&record) {
                Ok(json) => self.sink.write_line(&json),
                Err(e) => {
                    self.metrics.record_serialize_failure();
                    warn!(line_number, "Failed to serialize match record: {e}");
                }
            }
        }
    }
}
