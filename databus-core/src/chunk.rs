//! Split an owned byte buffer into fixed-size chunks.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use bytes::Bytes;
use thiserror::Error;

use crate::progress::{ProgressSink, ProgressTracker, TransferProgress};

/// Default chunk size: one mebibyte.
pub const DEFAULT_CHUNK_SIZE: usize = 1_048_576;

/// Errors returned by [`ChunkSize::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkSizeError {
    /// A chunk size of zero was requested.
    #[error("chunk size must be greater than zero")]
    Zero,
}

/// A validated, strictly positive chunk size in bytes.
///
/// # Examples
/// ```
/// use databus_core::ChunkSize;
///
/// assert_eq!(ChunkSize::default().get(), 1_048_576);
/// assert!(ChunkSize::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "usize", into = "usize"))]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    /// Validate `size`, rejecting zero.
    pub const fn new(size: usize) -> Result<Self, ChunkSizeError> {
        match NonZeroUsize::new(size) {
            Some(inner) => Ok(Self(inner)),
            None => Err(ChunkSizeError::Zero),
        }
    }

    /// The size in bytes.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Number of chunks needed to cover `len` bytes.
    #[must_use]
    pub const fn chunks_for(self, len: usize) -> usize {
        len.div_ceil(self.0.get())
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_CHUNK_SIZE.saturating_sub(1)))
    }
}

impl TryFrom<usize> for ChunkSize {
    type Error = ChunkSizeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChunkSize> for usize {
    fn from(value: ChunkSize) -> Self {
        value.get()
    }
}

/// Convert a buffer length to the `u64` used for progress accounting.
pub(crate) fn byte_len(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Lazy, finite iterator over chunks of an owned buffer.
///
/// Before each chunk is yielded the sink receives the number of bytes handed
/// out so far, the operation label and the clock glyph for the chunk index.
/// Chunks are zero-copy views into the original [`Bytes`].
///
/// # Examples
/// ```
/// use bytes::Bytes;
/// use databus_core::{ChunkIter, ChunkSize, FnProgress};
///
/// # fn main() -> Result<(), databus_core::ChunkSizeError> {
/// let mut seen = Vec::new();
/// let chunks: Vec<Bytes> = ChunkIter::new(
///     Bytes::from_static(b"abcdefg"),
///     ChunkSize::new(3)?,
///     "Uploading File",
///     FnProgress(|bytes: u64, _: &str, _: &str| seen.push(bytes)),
/// )
/// .collect();
/// assert_eq!(chunks, vec!["abc", "def", "g"]);
/// assert_eq!(seen, vec![0, 3, 6]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChunkIter<S> {
    remaining: Bytes,
    chunk_size: ChunkSize,
    tracker: ProgressTracker<S>,
}

impl<S: ProgressSink> ChunkIter<S> {
    /// Take ownership of `buffer` and prepare to slice it.
    pub fn new(buffer: Bytes, chunk_size: ChunkSize, label: impl Into<String>, sink: S) -> Self {
        Self {
            remaining: buffer,
            chunk_size,
            tracker: ProgressTracker::new(label, sink),
        }
    }

    /// Totals for the chunks yielded so far.
    pub const fn progress(&self) -> &TransferProgress {
        self.tracker.progress()
    }
}

impl<S: ProgressSink> Iterator for ChunkIter<S> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.chunk_size.get().min(self.remaining.len());
        self.tracker.announce(byte_len(take));
        Some(self.remaining.split_to(take))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.chunk_size.chunks_for(self.remaining.len());
        (left, Some(left))
    }
}

impl<S: ProgressSink> ExactSizeIterator for ChunkIter<S> {}

impl<S: ProgressSink> FusedIterator for ChunkIter<S> {}
