//! In-memory doubles for sources, WebDAV stores, SPARQL endpoints and
//! deployers, used by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use databus_core::DavPath;
use futures_util::stream;

use crate::catalog::{CatalogError, SparqlEndpoint, SparqlResults};
use crate::deploy::{DatasetDeployer, DeployError};
use crate::http::{ByteSource, ByteStream, TransportError, UploadBody};
use crate::webdav::{DavResponse, WebDavStore};

/// Run a future to completion on a fresh current-thread runtime.
///
/// # Panics
/// Panics when the runtime cannot be built.
#[expect(clippy::expect_used, reason = "test helper fails loudly")]
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime")
        .block_on(future)
}

#[derive(Debug, Clone)]
enum StubBody {
    Chunks(Vec<Bytes>),
    Status { status: u16, body: String },
    BreaksAfter(Vec<Bytes>),
}

/// [`ByteSource`] serving canned bytes or a canned failure.
#[derive(Debug, Clone)]
pub struct StubSource {
    location: String,
    body: StubBody,
    opened: RefCell<usize>,
}

impl StubSource {
    fn with_body(body: StubBody) -> Self {
        Self {
            location: "https://databus.example.org/file.ttl".to_owned(),
            body,
            opened: RefCell::new(0),
        }
    }

    /// Serve `data` in a single read.
    pub fn with_bytes(data: impl Into<Bytes>) -> Self {
        Self::with_body(StubBody::Chunks(vec![data.into()]))
    }

    /// Serve `data` split into network reads of `read_size` bytes.
    pub fn with_reads(data: &[u8], read_size: usize) -> Self {
        let reads = data
            .chunks(read_size.max(1))
            .map(Bytes::copy_from_slice)
            .collect();
        Self::with_body(StubBody::Chunks(reads))
    }

    /// Answer every open with an error status.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self::with_body(StubBody::Status {
            status,
            body: body.into(),
        })
    }

    /// Serve `data` and then fail mid-stream.
    pub fn breaking_after(data: impl Into<Bytes>) -> Self {
        Self::with_body(StubBody::BreaksAfter(vec![data.into()]))
    }

    /// How many times the source was opened.
    #[must_use]
    pub fn open_count(&self) -> usize {
        *self.opened.borrow()
    }
}

#[async_trait(?Send)]
impl ByteSource for StubSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn open(&self) -> Result<ByteStream, TransportError> {
        *self.opened.borrow_mut() += 1;
        match &self.body {
            StubBody::Chunks(chunks) => Ok(Box::pin(stream::iter(
                chunks.clone().into_iter().map(Ok::<_, TransportError>),
            ))),
            StubBody::Status { status, body } => Err(TransportError::Http {
                url: self.location.clone(),
                status: *status,
                message: body.clone(),
            }),
            StubBody::BreaksAfter(chunks) => {
                let url = self.location.clone();
                let items = chunks
                    .clone()
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(TransportError::Network {
                        url,
                        source: io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"),
                    })));
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}

/// A request observed by [`StubWebDav`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavCall {
    /// `HEAD` of a collection.
    Probe(String),
    /// `MKCOL` of a collection.
    MakeCollection(String),
    /// `PUT` of a file.
    Put(String),
}

/// In-memory WebDAV store recording every request.
#[derive(Debug, Default)]
pub struct StubWebDav {
    collections: RefCell<BTreeSet<String>>,
    mkcol_failures: HashMap<String, u16>,
    put_status: Option<u16>,
    unreachable_probes: bool,
    calls: RefCell<Vec<DavCall>>,
    files: RefCell<HashMap<String, Vec<u8>>>,
}

impl StubWebDav {
    /// A store that already contains `collections`.
    pub fn with_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: RefCell::new(collections.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Answer `MKCOL` of `collection` with `status`.
    #[must_use]
    pub fn failing_mkcol(mut self, collection: impl Into<String>, status: u16) -> Self {
        self.mkcol_failures.insert(collection.into(), status);
        self
    }

    /// Answer every `PUT` with `status` after draining the body.
    #[must_use]
    pub const fn with_put_status(mut self, status: u16) -> Self {
        self.put_status = Some(status);
        self
    }

    /// Fail every probe at the transport level.
    #[must_use]
    pub const fn with_unreachable_probes(mut self) -> Self {
        self.unreachable_probes = true;
        self
    }

    /// Requests in the order they were issued.
    #[must_use]
    pub fn calls(&self) -> Vec<DavCall> {
        self.calls.borrow().clone()
    }

    /// Collections targeted by `MKCOL`, in order.
    #[must_use]
    pub fn created(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DavCall::MakeCollection(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `PUT` requests.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, DavCall::Put(_)))
            .count()
    }

    /// Stored contents of `path`.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

#[async_trait(?Send)]
impl WebDavStore for StubWebDav {
    fn collection_url(&self, collection: &str) -> String {
        format!("https://databus.example.org/dav/alice/{collection}/")
    }

    fn file_url(&self, path: &DavPath) -> String {
        format!("https://databus.example.org/dav/alice/{path}")
    }

    async fn probe(&self, collection: &str) -> Result<u16, TransportError> {
        self.calls
            .borrow_mut()
            .push(DavCall::Probe(collection.to_owned()));
        if self.unreachable_probes {
            return Err(TransportError::Network {
                url: self.collection_url(collection),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
            });
        }
        Ok(if self.collections.borrow().contains(collection) {
            405
        } else {
            404
        })
    }

    async fn make_collection(&self, collection: &str) -> Result<DavResponse, TransportError> {
        self.calls
            .borrow_mut()
            .push(DavCall::MakeCollection(collection.to_owned()));
        if let Some(status) = self.mkcol_failures.get(collection) {
            return Ok(DavResponse {
                status: *status,
                body: "forbidden".to_owned(),
            });
        }
        self.collections.borrow_mut().insert(collection.to_owned());
        Ok(DavResponse {
            status: 201,
            body: String::new(),
        })
    }

    async fn put(&self, path: &DavPath, body: UploadBody) -> Result<DavResponse, TransportError> {
        let key = path.to_string();
        self.calls.borrow_mut().push(DavCall::Put(key.clone()));
        let url = self.file_url(path);
        let data = body
            .collect()
            .await
            .map_err(|source| TransportError::Network { url, source })?;
        if let Some(status) = self.put_status {
            return Ok(DavResponse {
                status,
                body: "rejected".to_owned(),
            });
        }
        self.files.borrow_mut().insert(key, data);
        Ok(DavResponse {
            status: 201,
            body: String::new(),
        })
    }
}

/// SPARQL endpoint answering from a table of canned responses.
///
/// Queries are matched by substring; the first matching entry wins.
#[derive(Debug, Default)]
pub struct StubSparql {
    answers: Vec<(String, String)>,
    queries: RefCell<Vec<String>>,
}

impl StubSparql {
    /// Answer queries containing `needle` with the SPARQL JSON `response`.
    #[must_use]
    pub fn answering(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.answers.push((needle.into(), response.into()));
        self
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// SPARQL JSON with a single variable bound to `values`.
    #[must_use]
    pub fn bindings(var: &str, values: &[&str]) -> String {
        let rows: Vec<String> = values
            .iter()
            .map(|value| format!(r#"{{"{var}": {{"type": "uri", "value": "{value}"}}}}"#))
            .collect();
        format!(
            r#"{{"head": {{"vars": ["{var}"]}}, "results": {{"bindings": [{}]}}}}"#,
            rows.join(",")
        )
    }
}

#[async_trait(?Send)]
impl SparqlEndpoint for StubSparql {
    async fn select(&self, query: &str) -> Result<SparqlResults, CatalogError> {
        self.queries.borrow_mut().push(query.to_owned());
        let answer = self
            .answers
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, response)| response.clone());
        match answer {
            Some(response) => SparqlResults::parse("stub", response.into_bytes()),
            None => Err(CatalogError::Transport(TransportError::Http {
                url: "stub".to_owned(),
                status: 500,
                message: "no canned answer".to_owned(),
            })),
        }
    }
}

/// Deployer that stores submitted documents.
#[derive(Debug, Default)]
pub struct StubDeployer {
    reject_with: Option<u16>,
    documents: RefCell<Vec<serde_json::Value>>,
}

impl StubDeployer {
    /// Reject every document with `status`.
    #[must_use]
    pub const fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            documents: RefCell::new(Vec::new()),
        }
    }

    /// Documents accepted so far.
    #[must_use]
    pub fn documents(&self) -> Vec<serde_json::Value> {
        self.documents.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DatasetDeployer for StubDeployer {
    async fn deploy(&self, document: &serde_json::Value) -> Result<(), DeployError> {
        if let Some(status) = self.reject_with {
            return Err(DeployError::Rejected {
                status,
                body: "invalid dataset".to_owned(),
            });
        }
        self.documents.borrow_mut().push(document.clone());
        Ok(())
    }
}
