//! Progress reporting for chunked transfers.
//!
//! Transfers report once per chunk through a [`ProgressSink`]. The sink sees
//! the number of bytes processed so far, a human-readable operation label,
//! and a clock glyph that cycles with the chunk index so a UI can show that
//! work is still moving.

use std::sync::{Arc, Mutex, PoisonError};

use log::info;

/// Map a chunk counter to one of ten clock glyphs.
///
/// The glyph depends only on `counter % 10`, so the sequence repeats every
/// ten chunks.
///
/// # Examples
/// ```
/// use databus_core::clock_symbol;
///
/// assert_eq!(clock_symbol(0), "🕛");
/// assert_eq!(clock_symbol(13), clock_symbol(3));
/// ```
#[must_use]
pub const fn clock_symbol(counter: u64) -> &'static str {
    match counter.rem_euclid(10) {
        0 => "🕛",
        1 => "🕐",
        2 => "🕑",
        3 => "🕓",
        4 => "🕔",
        5 => "🕕",
        6 => "🕖",
        7 => "🕗",
        8 => "🕘",
        _ => "🕚",
    }
}

/// Receives one update per transferred chunk.
pub trait ProgressSink {
    /// Called once per chunk with the bytes processed so far, the operation
    /// label, and the clock glyph for the chunk index.
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str);
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        (**self).on_chunk(bytes_processed, label, symbol);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        (**self).on_chunk(bytes_processed, label, symbol);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Arc<Mutex<S>> {
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_chunk(bytes_processed, label, symbol);
    }
}

/// Progress sink shared between a caller and a `'static` upload body.
pub type SharedProgress = Arc<Mutex<dyn ProgressSink + Send>>;

/// Wrap a sink so it can travel inside an HTTP body stream.
///
/// # Examples
/// ```
/// use databus_core::{LogProgress, ProgressSink, shared_progress};
///
/// let mut shared = shared_progress(LogProgress);
/// shared.on_chunk(1024, "Uploading File", "🕐");
/// ```
pub fn shared_progress<S>(sink: S) -> SharedProgress
where
    S: ProgressSink + Send + 'static,
{
    Arc::new(Mutex::new(sink))
}

/// Adapter turning a closure into a [`ProgressSink`].
///
/// # Examples
/// ```
/// use databus_core::{FnProgress, ProgressSink};
///
/// let mut seen = Vec::new();
/// let mut sink = FnProgress(|bytes: u64, _: &str, _: &str| seen.push(bytes));
/// sink.on_chunk(10, "Downloading File", "🕛");
/// drop(sink);
/// assert_eq!(seen, vec![10]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnProgress<F>(pub F);

impl<F> ProgressSink for FnProgress<F>
where
    F: FnMut(u64, &str, &str),
{
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        (self.0)(bytes_processed, label, symbol);
    }
}

/// Sink that forwards updates to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_chunk(&mut self, bytes_processed: u64, label: &str, symbol: &str) {
        info!("{label} {symbol} ({bytes_processed} bytes)");
    }
}

/// Running totals for a single transfer direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes accounted for so far.
    pub bytes_transferred: u64,
    /// Number of chunks recorded.
    pub total_chunks: u64,
    /// Label and clock glyph of the most recent chunk.
    pub description: String,
}

impl TransferProgress {
    /// Account for one more chunk of `chunk_len` bytes.
    ///
    /// Returns the clock glyph assigned to the recorded chunk.
    pub fn record(&mut self, chunk_len: u64, label: &str) -> &'static str {
        let symbol = clock_symbol(self.total_chunks);
        self.bytes_transferred = self.bytes_transferred.saturating_add(chunk_len);
        self.total_chunks = self.total_chunks.saturating_add(1);
        self.description = format!("{label} {symbol}");
        symbol
    }
}

/// Couples a [`TransferProgress`] with the sink that observes it.
#[derive(Debug)]
pub struct ProgressTracker<S> {
    label: String,
    progress: TransferProgress,
    sink: S,
}

impl<S: ProgressSink> ProgressTracker<S> {
    /// Create a tracker reporting under `label`.
    pub fn new(label: impl Into<String>, sink: S) -> Self {
        Self {
            label: label.into(),
            progress: TransferProgress::default(),
            sink,
        }
    }

    /// Report the bytes seen *before* a chunk, then record it.
    ///
    /// Used when a chunk is about to be handed out, so the reported count
    /// excludes the chunk itself.
    pub fn announce(&mut self, chunk_len: u64) {
        let symbol = clock_symbol(self.progress.total_chunks);
        self.sink
            .on_chunk(self.progress.bytes_transferred, &self.label, symbol);
        self.progress.record(chunk_len, &self.label);
    }

    /// Record a chunk that has just arrived, then report the new total.
    pub fn advance(&mut self, chunk_len: u64) {
        let symbol = self.progress.record(chunk_len, &self.label);
        self.sink
            .on_chunk(self.progress.bytes_transferred, &self.label, symbol);
    }

    /// Current totals.
    pub const fn progress(&self) -> &TransferProgress {
        &self.progress
    }

    /// Consume the tracker and return its totals.
    pub fn into_progress(self) -> TransferProgress {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;
    use rstest::rstest;

    #[rstest]
    #[case(0, "🕛")]
    #[case(3, "🕓")]
    #[case(9, "🕚")]
    #[case(10, "🕛")]
    #[case(u64::MAX, "🕕")]
    fn clock_symbols_follow_the_table(#[case] counter: u64, #[case] expected: &str) {
        assert_eq!(clock_symbol(counter), expected);
    }

    #[rstest]
    fn clock_has_ten_distinct_faces() {
        let mut faces: Vec<&str> = (0..10).map(clock_symbol).collect();
        faces.sort_unstable();
        faces.dedup();
        assert_eq!(faces.len(), 10);
    }

    #[rstest]
    fn record_updates_totals_and_description() {
        let mut progress = TransferProgress::default();
        assert_eq!(progress.record(5, "Downloading File"), "🕛");
        assert_eq!(progress.record(7, "Downloading File"), "🕐");
        assert_eq!(progress.bytes_transferred, 12);
        assert_eq!(progress.total_chunks, 2);
        assert_eq!(progress.description, "Downloading File 🕐");
    }

    #[rstest]
    fn announce_reports_bytes_before_the_chunk() {
        let mut sink = RecordingSink::default();
        let mut tracker = ProgressTracker::new("Uploading File", &mut sink);
        tracker.announce(4);
        tracker.announce(4);
        drop(tracker);
        let bytes: Vec<u64> = sink.events().iter().map(|event| event.bytes).collect();
        assert_eq!(bytes, vec![0, 4]);
    }

    #[rstest]
    fn advance_reports_bytes_including_the_chunk() {
        let mut sink = RecordingSink::default();
        let mut tracker = ProgressTracker::new("Downloading File", &mut sink);
        tracker.advance(4);
        tracker.advance(2);
        assert_eq!(tracker.progress().bytes_transferred, 6);
        drop(tracker);
        let bytes: Vec<u64> = sink.events().iter().map(|event| event.bytes).collect();
        assert_eq!(bytes, vec![4, 6]);
        assert!(
            sink.events()
                .iter()
                .all(|event| event.label == "Downloading File")
        );
    }

    #[rstest]
    fn shared_sink_forwards_through_the_mutex() {
        let recorder = Arc::new(Mutex::new(RecordingSink::default()));
        let mut shared: SharedProgress = recorder.clone();
        shared.on_chunk(8, "Transferring File", "🕐");
        let guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(guard.events().len(), 1);
    }
}
