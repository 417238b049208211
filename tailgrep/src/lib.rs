pub mod cancel;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod scan;

pub use cancel::CancelToken;
pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use results::{MatchRecord, ScanSummary};
pub use scan::sink::{CollectSink, MatchSink, StdoutSink};
pub use scan::{scan, scan_with};
