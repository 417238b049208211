use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Fixed message stamped into every match record.
pub const MATCH_MESSAGE: &str = "tailgrep matched a line";

/// One matched line, ready for serialization.
///
/// Field names serialize in PascalCase (`LineNumber`, `LogMessage`, ...) so
/// the emitted JSON matches the established record shape consumed
/// downstream. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchRecord {
    pub host: String,
    pub filename: String,
    pub query: String,
    pub line_number: u64,
    pub timestamp: String,
    pub log_message: String,
    pub message: String,
}

impl MatchRecord {
    /// Builds a record for one matched line, timestamped now.
    pub fn new(
        host: &str,
        filename: &str,
        query: &str,
        line_number: u64,
        log_message: &str,
    ) -> Self {
        Self {
            host: host.to_string(),
            filename: filename.to_string(),
            query: query.to_string(),
            line_number,
            timestamp: timestamp_utc(),
            log_message: log_message.to_string(),
            message: MATCH_MESSAGE.to_string(),
        }
    }
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision,
/// e.g. `2026-08-31T12:34:56.789Z`.
pub fn timestamp_utc() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Final totals for one run. Stable once the worker pool has drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Lines read by the scanner loop
    pub lines_scanned: u64,
    /// Lines that satisfied the matcher
    pub total_matches: u64,
    /// Batches handed to workers
    pub batches_dispatched: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = MatchRecord::new("web01", "app.log", "ERROR", 42, "ERROR: boom");

        assert_eq!(record.host, "web01");
        assert_eq!(record.filename, "app.log");
        assert_eq!(record.query, "ERROR");
        assert_eq!(record.line_number, 42);
        assert_eq!(record.log_message, "ERROR: boom");
        assert_eq!(record.message, MATCH_MESSAGE);
        assert!(!record.timestamp.is_empty());
    }

    #[test]
    fn test_record_serializes_pascal_case() {
        let record = MatchRecord::new("web01", "app.log", "ERROR", 7, "ERROR: boom");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"Host\":\"web01\""));
        assert!(json.contains("\"Filename\":\"app.log\""));
        assert!(json.contains("\"Query\":\"ERROR\""));
        assert!(json.contains("\"LineNumber\":7"));
        assert!(json.contains("\"LogMessage\":\"ERROR: boom\""));
        assert!(json.contains("\"Message\""));
        assert!(json.contains("\"Timestamp\""));
    }

    #[test]
    fn test_timestamp_shape() {
        let stamp = timestamp_utc();
        // 2026-08-31T12:34:56.789Z
        assert_eq!(stamp.len(), 24);
        assert!(stamp.ends_with('Z'));
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
        assert_eq!(&stamp[19..20], ".");
    }

    #[test]
    fn test_summary_default() {
        let summary = ScanSummary::default();
        assert_eq!(summary.lines_scanned, 0);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.batches_dispatched, 0);
    }
}
