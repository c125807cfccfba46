//! Errors raised while preparing WebDAV collections.

use thiserror::Error;

use crate::http::TransportError;

/// Failure to create the directories leading up to an upload path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebDavError {
    /// The server answered a collection request with an unexpected status.
    #[error("Exception during WebDAV Request {method} to {url}: {status} {body}")]
    DirectoryCreation {
        /// HTTP method issued.
        method: String,
        /// Collection URL.
        url: String,
        /// Status returned.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The request could not be completed.
    #[error("WebDAV request failed: {source}")]
    Transport {
        /// Underlying transport failure.
        #[from]
        source: TransportError,
    },
}
