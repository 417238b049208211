use std::sync::Mutex;

/// Destination for serialized match records.
///
/// Workers call this concurrently; implementations must be safe to share.
/// The engine serializes the record before calling, so a sink only deals in
/// finished JSON lines.
pub trait MatchSink: Send + Sync {
    fn write_line(&self, json: &str);
}

/// Writes each record as one JSON line on stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl MatchSink for StdoutSink {
    fn write_line(&self, json: &str) {
        println!("{json}");
    }
}

/// Collects records in memory. Test and embedding helper.
#[derive(Debug, Default)]
pub struct CollectSink {
    lines: Mutex<Vec<String>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl MatchSink for CollectSink {
    fn write_line(&self, json: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(json.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_sink_keeps_lines() {
        let sink = CollectSink::new();
        sink.write_line("{\"a\":1}");
        sink.write_line("{\"b\":2}");
        assert_eq!(sink.lines(), vec!["{\"a\":1}", "{\"b\":2}"]);
    }
}
