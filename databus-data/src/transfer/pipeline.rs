//! Move bytes from a source to a target, chunk by chunk.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::{Bytes, BytesMut};
use databus_core::{ChunkIter, ChunkSize, ProgressTracker, SharedProgress};
use futures_util::StreamExt;
use log::{error, info};
use sha2::{Digest, Sha256};

use super::error::{TerminalState, TransferError};
use super::target::TransferTarget;
use crate::http::{ByteSource, ByteStream, Rechunk, TransportError, UploadBody};

/// Progress label while buffering a download.
pub const DOWNLOAD_LABEL: &str = "Downloading File";
/// Progress label while uploading a buffered payload.
pub const UPLOAD_LABEL: &str = "Uploading File";
/// Progress label while streaming straight from source to target.
pub const STREAM_LABEL: &str = "Transferring File";

/// Whether the payload is held in memory before uploading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BufferMode {
    /// Chunks flow from the source into the upload as they arrive.
    #[default]
    Streaming,
    /// The whole payload is downloaded before the upload starts.
    InMemory,
}

/// Tuning for a single transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferRequest {
    /// Size of the chunks reported and uploaded.
    pub chunk_size: ChunkSize,
    /// Buffering policy.
    pub mode: BufferMode,
}

/// What a successful transfer moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Number of bytes written to the target.
    pub bytes: u64,
    /// Number of chunks.
    pub chunks: u64,
    /// Hex-encoded SHA-256 of the payload.
    pub sha256: String,
}

/// Terminal state of a transfer with its report or error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Every byte reached the target.
    Success(TransferReport),
    /// The source could not be read.
    DownloadFailed {
        /// Human-readable reason.
        message: String,
    },
    /// The target could not be prepared or written.
    UploadFailed {
        /// Human-readable reason.
        message: String,
    },
}

impl TransferOutcome {
    /// Collapse a transfer result into its terminal state.
    #[must_use]
    pub fn from_result(result: Result<TransferReport, TransferError>) -> Self {
        match result {
            Ok(report) => Self::Success(report),
            Err(err) => match err.terminal_state() {
                TerminalState::DownloadFailed => Self::DownloadFailed {
                    message: err.to_string(),
                },
                TerminalState::UploadFailed | TerminalState::Success => Self::UploadFailed {
                    message: err.to_string(),
                },
            },
        }
    }

    /// The terminal state reached.
    #[must_use]
    pub const fn state(&self) -> TerminalState {
        match self {
            Self::Success(_) => TerminalState::Success,
            Self::DownloadFailed { .. } => TerminalState::DownloadFailed,
            Self::UploadFailed { .. } => TerminalState::UploadFailed,
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    bytes: u64,
    chunks: u64,
    hasher: Sha256,
    failure: Option<TransportError>,
}

impl Tally {
    fn record(&mut self, chunk: &[u8]) {
        self.bytes = self.bytes.saturating_add(byte_len(chunk.len()));
        self.chunks = self.chunks.saturating_add(1);
        self.hasher.update(chunk);
    }

    fn report(self) -> TransferReport {
        TransferReport {
            bytes: self.bytes,
            chunks: self.chunks,
            sha256: hex::encode(self.hasher.finalize()),
        }
    }
}

fn lock(tally: &Mutex<Tally>) -> MutexGuard<'_, Tally> {
    tally.lock().unwrap_or_else(PoisonError::into_inner)
}

fn byte_len(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Copy everything `source` yields into `target`.
///
/// The source is opened first; an error status ends the transfer before the
/// target is touched. The target is then prepared and receives the payload
/// in chunks of `request.chunk_size`, reporting to `progress` once per
/// chunk. No step is retried.
pub async fn transfer<S, T>(
    source: &S,
    target: &T,
    request: TransferRequest,
    progress: SharedProgress,
) -> Result<TransferReport, TransferError>
where
    S: ByteSource + ?Sized,
    T: TransferTarget + ?Sized,
{
    info!("Loading file from {}", source.location());
    let stream = source.open().await.map_err(TransferError::from_source)?;
    let chunks = Rechunk::new(stream, request.chunk_size);
    match request.mode {
        BufferMode::InMemory => {
            transfer_buffered(chunks, target, request.chunk_size, progress).await
        }
        BufferMode::Streaming => transfer_streaming(chunks, target, progress).await,
    }
}

async fn transfer_buffered<T: TransferTarget + ?Sized>(
    mut chunks: Rechunk<ByteStream>,
    target: &T,
    chunk_size: ChunkSize,
    progress: SharedProgress,
) -> Result<TransferReport, TransferError> {
    let mut buffer = BytesMut::new();
    let mut tally = Tally::default();
    let mut tracker = ProgressTracker::new(DOWNLOAD_LABEL, Arc::clone(&progress));
    while let Some(next) = chunks.next().await {
        let chunk = next.map_err(TransferError::from_source)?;
        tally.record(&chunk);
        tracker.advance(byte_len(chunk.len()));
        buffer.extend_from_slice(&chunk);
    }
    target.prepare().await?;
    info!("Uploading file to {}", target.location());
    let payload: Bytes = buffer.freeze();
    let length = byte_len(payload.len());
    let upload = ChunkIter::new(payload, chunk_size, UPLOAD_LABEL, progress);
    target
        .upload(UploadBody::from_chunks(upload, length))
        .await?;
    Ok(tally.report())
}

async fn transfer_streaming<T: TransferTarget + ?Sized>(
    chunks: Rechunk<ByteStream>,
    target: &T,
    progress: SharedProgress,
) -> Result<TransferReport, TransferError> {
    target.prepare().await?;
    info!("Streaming file to {}", target.location());
    let tally = Arc::new(Mutex::new(Tally::default()));
    let body_tally = Arc::clone(&tally);
    let mut tracker = ProgressTracker::new(STREAM_LABEL, progress);
    let body = chunks.map(move |next| match next {
        Ok(chunk) => {
            lock(&body_tally).record(&chunk);
            tracker.advance(byte_len(chunk.len()));
            Ok(chunk)
        }
        Err(err) => {
            let message = err.to_string();
            lock(&body_tally).failure = Some(err);
            Err(io::Error::other(message))
        }
    });
    let uploaded = target.upload(UploadBody::from_stream(body)).await;
    let mut state = lock(&tally);
    if let Some(failure) = state.failure.take() {
        return Err(TransferError::from_source(failure));
    }
    uploaded?;
    Ok(std::mem::take(&mut *state).report())
}

/// Run [`transfer`] and log how it ended.
///
/// Never fails: every error is folded into the returned outcome.
pub async fn run_transfer<S, T>(
    source: &S,
    target: &T,
    request: TransferRequest,
    progress: SharedProgress,
) -> TransferOutcome
where
    S: ByteSource + ?Sized,
    T: TransferTarget + ?Sized,
{
    let outcome = TransferOutcome::from_result(transfer(source, target, request, progress).await);
    match &outcome {
        TransferOutcome::Success(report) => info!(
            "Upload Successful ✓ ({} bytes, sha256 {})",
            report.bytes, report.sha256
        ),
        TransferOutcome::DownloadFailed { message } => error!("Download Failed ❌ {message}"),
        TransferOutcome::UploadFailed { message } => error!("Upload Failed ❌ {message}"),
    }
    outcome
}
