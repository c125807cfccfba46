//! Transport-level failures shared by every HTTP adapter.

use std::io;

use thiserror::Error;

/// Errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server answered with an error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, or a short description when none was readable.
        message: String,
    },
    /// The request failed before a complete response was received.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
}

impl TransportError {
    /// The request URL the failure relates to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. } | Self::Network { url, .. } => url,
        }
    }

    /// HTTP status, when the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }
}

/// Map a `reqwest` failure onto [`TransportError`].
pub(crate) fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}

/// Turn an error response into [`TransportError::Http`], keeping its body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> TransportError {
    let url = response.url().to_string();
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => body,
        Err(err) => format!("<unreadable body: {err}>"),
    };
    TransportError::Http {
        url,
        status,
        message,
    }
}
