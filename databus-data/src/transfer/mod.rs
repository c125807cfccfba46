//! Chunked transfer of a file from a source to a target with progress
//! reporting.
//!
//! A transfer ends in exactly one [`TerminalState`]: `Success`,
//! `DownloadFailed` (the source could not be read) or `UploadFailed` (the
//! target could not be prepared or written).

mod error;
mod pipeline;
mod target;

pub use error::{TerminalState, TransferError};
pub use pipeline::{
    BufferMode, DOWNLOAD_LABEL, STREAM_LABEL, TransferOutcome, TransferReport, TransferRequest,
    UPLOAD_LABEL, run_transfer, transfer,
};
pub use target::{FileTarget, TransferTarget, WebDavTarget};

#[cfg(test)]
mod tests;
