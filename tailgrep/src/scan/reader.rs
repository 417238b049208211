use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use tracing::warn;

const BUFFER_CAPACITY: usize = 65536;

/// Buffered line reader over an open file with an explicitly tracked byte
/// offset.
///
/// The offset makes follow mode a resume rather than a re-scan: after EOF
/// the same reader keeps going from where it stopped once the file grows,
/// and the file is never reopened.
#[derive(Debug)]
pub struct TailReader {
    inner: BufReader<File>,
    position: u64,
    hold_partial: bool,
}

impl TailReader {
    /// Wraps an open file positioned at its start.
    ///
    /// With `hold_partial` set (follow mode), a trailing line that has no
    /// newline yet is treated as not-yet-written: the reader rewinds to its
    /// recorded offset and reports EOF, so the line is read exactly once,
    /// complete, on a later pass. Without it (single pass), the final
    /// unterminated line is returned as-is.
    pub fn new(file: File, hold_partial: bool) -> Self {
        Self {
            inner: BufReader::with_capacity(BUFFER_CAPACITY, file),
            position: 0,
            hold_partial,
        }
    }

    /// Byte offset of the next unread line.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next line, stripping the `\n` or `\r\n` terminator.
    /// Returns `Ok(None)` at (current) end of input.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let n = self.inner.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }

        if self.hold_partial && !buf.ends_with(b"\n") {
            // Line still being appended; rewind and wait for its newline
            self.inner.seek(SeekFrom::Start(self.position))?;
            return Ok(None);
        }

        self.position += n as u64;

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        Ok(Some(decode_lossy(buf)))
    }
}

/// Decodes a raw line, replacing invalid UTF-8 rather than failing the scan.
fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(err) => {
            warn!("Invalid UTF-8 in line, replacing bad sequences");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}
