//! SPARQL 1.1 Graph Store Protocol endpoints as transfer sources and
//! targets.
//!
//! A named graph is addressed as `{endpoint}?graph=<iri>`; uploads add
//! `replace=true` so the graph is overwritten rather than appended to.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use thiserror::Error;
use url::Url;

use crate::http::{HttpSource, UploadBody, convert_reqwest_error, error_from_response};
use crate::transfer::{TransferError, TransferTarget};

/// Media type used for graph payloads.
pub const TURTLE: &str = "text/turtle";

/// Errors raised while addressing a graph store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphStoreError {
    /// The endpoint is not an absolute URL.
    #[error("invalid graph store endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
        /// Parser failure.
        source: url::ParseError,
    },
}

/// URL of `graph` within the store at `endpoint`.
///
/// # Examples
/// ```
/// use databus_data::graph::graph_url;
///
/// # fn main() -> Result<(), databus_data::graph::GraphStoreError> {
/// let url = graph_url("https://store.example.org/graph", "https://example.org/g", true)?;
/// assert_eq!(
///     url.as_str(),
///     "https://store.example.org/graph?graph=https%3A%2F%2Fexample.org%2Fg&replace=true"
/// );
/// # Ok(())
/// # }
/// ```
pub fn graph_url(endpoint: &str, graph: &str, replace: bool) -> Result<Url, GraphStoreError> {
    let mut url = Url::parse(endpoint).map_err(|source| GraphStoreError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("graph", graph);
        if replace {
            query.append_pair("replace", "true");
        }
    }
    Ok(url)
}

/// Source reading a named graph as Turtle.
pub fn graph_source(
    client: Client,
    endpoint: &str,
    graph: &str,
    token: Option<String>,
) -> Result<HttpSource, GraphStoreError> {
    let url = graph_url(endpoint, graph, false)?;
    Ok(HttpSource::new(client, url.as_str())
        .with_accept(TURTLE)
        .with_token(token))
}

/// Target replacing a named graph with the transferred Turtle.
#[derive(Debug, Clone)]
pub struct GraphStoreTarget {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl GraphStoreTarget {
    /// Replace `graph` within the store at `endpoint`.
    pub fn new(client: Client, endpoint: &str, graph: &str) -> Result<Self, GraphStoreError> {
        Ok(Self {
            client,
            url: graph_url(endpoint, graph, true)?,
            token: None,
        })
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Request URL of the upload.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait(?Send)]
impl TransferTarget for GraphStoreTarget {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn prepare(&self) -> Result<(), TransferError> {
        Ok(())
    }

    async fn upload(&self, body: UploadBody) -> Result<(), TransferError> {
        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, TURTLE);
        if let Some(length) = body.length() {
            request = request.header(CONTENT_LENGTH, length);
        }
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request
            .body(body.into_reqwest())
            .send()
            .await
            .map_err(|err| TransferError::from_target(convert_reqwest_error(err, self.url.as_str())))?;
        if response.status().as_u16() >= 400 {
            return Err(TransferError::from_target(error_from_response(response).await));
        }
        Ok(())
    }
}
