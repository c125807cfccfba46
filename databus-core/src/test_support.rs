//! Progress sinks that record what they observe, for unit and behaviour
//! tests.

use crate::progress::ProgressSink;

/// A single observed progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Bytes reported as processed.
    pub bytes: u64,
    /// Operation label.
    pub label: String,
    /// Clock glyph.
    pub symbol: String,
}

/// `ProgressSink` that keeps every update in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<ProgressEvent>,
}

impl RecordingSink {
    /// Updates received so far.
    #[must_use]
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Reported byte counts, in order.
    #[must_use]
    pub fn byte_counts(&self) -> Vec<u64> {
        self.events.iter().map(|event| event.bytes).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        self.events.push(ProgressEvent {
            bytes: bytes_processed,
            label: label.to_owned(),
            symbol: symbol.to_owned(),
        });
    }
}
