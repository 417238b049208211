use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent batch workers when none (or an invalid
/// count) is requested.
pub const DEFAULT_MAX_WORKERS: usize = 2;

/// Default number of lines buffered before a batch is dispatched.
pub const DEFAULT_BATCH_CAPACITY: usize = 1000;

/// Default delay between follow-mode rescans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Immutable per-run settings for a scan.
///
/// Created once at startup (by the CLI or a test) and never mutated. The
/// worker ceiling and batch capacity are read through the `effective_*`
/// accessors, which substitute the documented defaults for values that would
/// make the engine unrunnable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Path of the line-oriented text file to scan
    pub path: PathBuf,

    /// Literal string or regular expression to match lines against
    pub query: String,

    /// Treat `query` as a regular expression instead of a substring
    #[serde(default)]
    pub is_regex: bool,

    /// Maximum number of concurrently running batch workers.
    /// Zero falls back to [`DEFAULT_MAX_WORKERS`].
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Number of lines buffered before a batch is handed to a worker.
    /// Zero falls back to [`DEFAULT_BATCH_CAPACITY`].
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,

    /// Keep scanning for newly appended lines instead of stopping at EOF
    #[serde(default)]
    pub follow: bool,

    /// Delay between follow-mode rescans
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Host identifier stamped into every match record
    #[serde(default = "default_host")]
    pub host: String,

    /// Emit each match record as a serialized line (debug output)
    #[serde(default)]
    pub emit_records: bool,
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_batch_capacity() -> usize {
    DEFAULT_BATCH_CAPACITY
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

/// Host identifier from the environment, or `"unknown"` if it can't be
/// determined.
pub fn default_host() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("HOST"))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl ScanConfig {
    /// Creates a config with defaults for everything except path and query.
    pub fn new(path: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            is_regex: false,
            max_workers: DEFAULT_MAX_WORKERS,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            follow: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            host: default_host(),
            emit_records: false,
        }
    }

    /// The worker ceiling actually enforced by the dispatcher.
    ///
    /// A ceiling of zero would deadlock admission, so it falls back to
    /// [`DEFAULT_MAX_WORKERS`]. Callers translating a signed flag should map
    /// negative values to zero first.
    pub fn effective_workers(&self) -> usize {
        if self.max_workers == 0 {
            DEFAULT_MAX_WORKERS
        } else {
            self.max_workers
        }
    }

    /// The batch capacity actually used by the scanner loop, at least 1.
    pub fn effective_batch_capacity(&self) -> usize {
        if self.batch_capacity == 0 {
            DEFAULT_BATCH_CAPACITY
        } else {
            self.batch_capacity
        }
    }
}
