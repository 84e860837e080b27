//! NDJSON Stream Decoder
//!
//! Turns raw HTTP body chunks into stream events. Chunks split lines at
//! arbitrary byte offsets (even mid-character), so raw bytes are buffered
//! and split on newlines before any UTF-8 conversion; the trailing fragment
//! is kept for the next chunk. A line that fails to parse is skipped and
//! counted, never surfaced as an error: one garbled line must not kill an
//! otherwise healthy analysis stream.

use bytes::BytesMut;
use leaselens_core::StreamEvent;

/// Incremental decoder for newline-delimited JSON event streams.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: BytesMut,
    skipped: u64,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk; returns the events completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        // Process complete lines; conversion happens per line so a
        // multi-byte character straddling chunks survives intact
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(line_end + 1);
            let line = String::from_utf8_lossy(&line[..line_end]);

            if let Some(event) = self.decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the residual fragment at end of stream. A final line without a
    /// trailing newline is decoded through the same path.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let residue = self.buffer.split();
        let residue = String::from_utf8_lossy(&residue);
        match self.decode_line(&residue) {
            Some(event) => vec![event],
            None => Vec::new(),
        }
    }

    /// Drain the malformed-line counter accumulated since the last call.
    pub fn take_skipped(&mut self) -> u64 {
        std::mem::take(&mut self.skipped)
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<StreamEvent>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                self.skipped += 1;
                tracing::debug!("[stream] skipping malformed line: {}", e);
                None
            }
        }
    }
}
