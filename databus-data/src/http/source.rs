//! Byte sources and upload bodies.

use std::fmt;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use super::error::{TransportError, convert_reqwest_error, error_from_response};

/// Boxed stream of body chunks produced by a [`ByteSource`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Somewhere bytes can be streamed from.
///
/// Opening a source performs the request and checks its status, so a missing
/// resource is reported before any byte reaches a target.
#[async_trait(?Send)]
pub trait ByteSource {
    /// Human-readable location used in logs and errors.
    fn location(&self) -> &str;

    /// Open the source and return its body as a stream of chunks.
    async fn open(&self) -> Result<ByteStream, TransportError>;
}

/// `GET` a URL and stream the response body.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    accept: Option<String>,
    token: Option<String>,
}

impl HttpSource {
    /// Stream `url` with the shared `client`.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            accept: None,
            token: None,
        }
    }

    /// Send an `Accept` header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

#[async_trait(?Send)]
impl ByteSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn open(&self) -> Result<ByteStream, TransportError> {
        let mut request = self.client.get(&self.url);
        if let Some(accept) = &self.accept {
            request = request.header(ACCEPT, accept.as_str());
        }
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        if response.status().as_u16() >= 400 {
            return Err(error_from_response(response).await);
        }
        let url = self.url.clone();
        Ok(Box::pin(
            response
                .bytes_stream()
                .map_err(move |err| convert_reqwest_error(err, &url)),
        ))
    }
}

/// Body handed to a transfer target.
///
/// The stream yields `io::Error` so it can be passed straight to an HTTP
/// client or a writer. `length` is known when the whole payload was buffered.
pub struct UploadBody {
    stream: Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>,
    length: Option<u64>,
}

impl UploadBody {
    /// Wrap a chunk stream of unknown length.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            length: None,
        }
    }

    /// Wrap an iterator of ready chunks with a known total length.
    pub fn from_chunks<I>(chunks: I, length: u64) -> Self
    where
        I: Iterator<Item = Bytes> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream::iter(chunks.map(Ok))),
            length: Some(length),
        }
    }

    /// Total length, when known up front.
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    /// Take the chunk stream.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>> {
        self.stream
    }

    /// Convert into a streaming `reqwest` body.
    pub fn into_reqwest(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self.stream)
    }

    /// Drain the body into memory.
    pub async fn collect(self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunks = self.stream;
        while let Some(chunk) = chunks.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl fmt::Debug for UploadBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadBody")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
