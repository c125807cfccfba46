//! Failures of a transfer and the terminal state each one leads to.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::http::TransportError;
use crate::webdav::WebDavError;

/// How a transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalState {
    /// Every byte reached the target.
    Success,
    /// The source could not be read.
    DownloadFailed,
    /// The target could not be prepared or written.
    UploadFailed,
}

/// Errors raised by [`transfer`](super::transfer).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    /// The source answered with an error status.
    #[error("download from {url} failed with status {status}: {body}")]
    Download {
        /// Source URL.
        url: String,
        /// Status returned.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The source could not be reached or broke off mid-stream.
    #[error("download from {url} failed: {source}")]
    Fetch {
        /// Source URL.
        url: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A directory above the target could not be created.
    #[error(transparent)]
    DirectoryCreation(#[from] WebDavError),
    /// The target answered the upload with an error status.
    #[error("upload to {url} failed with status {status}: {body}")]
    Upload {
        /// Target URL.
        url: String,
        /// Status returned.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The upload request could not be completed.
    #[error("upload to {url} failed: {source}")]
    UploadTransport {
        /// Target URL.
        url: String,
        /// Underlying transport failure.
        source: TransportError,
    },
    /// The local output file already exists.
    #[error("refusing to overwrite existing file {path}")]
    TargetExists {
        /// Output path.
        path: Utf8PathBuf,
    },
    /// Writing the local output file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

impl TransferError {
    /// Map a source failure onto a download error.
    pub(crate) fn from_source(error: TransportError) -> Self {
        match error {
            TransportError::Http {
                url,
                status,
                message,
            } => Self::Download {
                url,
                status,
                body: message,
            },
            TransportError::Network { url, source } => Self::Fetch { url, source },
        }
    }

    /// Map a target transport failure onto an upload error.
    pub(crate) fn from_target(error: TransportError) -> Self {
        match error {
            TransportError::Http {
                url,
                status,
                message,
            } => Self::Upload {
                url,
                status,
                body: message,
            },
            other @ TransportError::Network { .. } => Self::UploadTransport {
                url: other.url().to_owned(),
                source: other,
            },
        }
    }

    /// The terminal state this failure leads to.
    #[must_use]
    pub const fn terminal_state(&self) -> TerminalState {
        match self {
            Self::Download { .. } | Self::Fetch { .. } => TerminalState::DownloadFailed,
            Self::DirectoryCreation(_)
            | Self::Upload { .. }
            | Self::UploadTransport { .. }
            | Self::TargetExists { .. }
            | Self::Write { .. } => TerminalState::UploadFailed,
        }
    }
}
