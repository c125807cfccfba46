//! SPARQL `SELECT` over HTTP and its JSON result format.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use super::error::CatalogError;
use crate::http::{convert_reqwest_error, error_from_response};

/// Media type of SPARQL JSON results.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// A single bound RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SparqlTerm {
    /// Lexical value.
    pub value: String,
    /// `uri`, `literal` or `bnode`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ResultSet {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

/// Parsed `application/sparql-results+json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    results: ResultSet,
}

impl SparqlResults {
    /// Parse a response body received from `url`.
    pub fn parse(url: &str, mut body: Vec<u8>) -> Result<Self, CatalogError> {
        simd_json::serde::from_slice(&mut body).map_err(|source| CatalogError::Parse {
            url: url.to_owned(),
            source,
        })
    }

    /// Number of solutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    /// Whether there are no solutions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }

    /// Values bound to `key`, in solution order.
    ///
    /// When any solution leaves `key` unbound the whole result is treated as
    /// unusable and an empty list is returned.
    ///
    /// # Examples
    /// ```
    /// use databus_data::catalog::SparqlResults;
    ///
    /// # fn main() -> Result<(), databus_data::catalog::CatalogError> {
    /// let body = br#"{"results": {"bindings": [
    ///     {"g": {"type": "uri", "value": "https://d.org/a/g1"}},
    ///     {"g": {"type": "uri", "value": "https://d.org/a/g2"}}
    /// ]}}"#;
    /// let results = SparqlResults::parse("https://d.org/sparql", body.to_vec())?;
    /// assert_eq!(results.values_for_key("g"), ["https://d.org/a/g1", "https://d.org/a/g2"]);
    /// assert!(results.values_for_key("other").is_empty());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn values_for_key(&self, key: &str) -> Vec<String> {
        self.results
            .bindings
            .iter()
            .map(|solution| solution.get(key).map(|term| term.value.clone()))
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }
}

/// Something that answers SPARQL `SELECT` queries.
#[async_trait(?Send)]
pub trait SparqlEndpoint {
    /// Run `query` and return its solutions.
    async fn select(&self, query: &str) -> Result<SparqlResults, CatalogError>;
}

/// SPARQL protocol endpoint reached with `GET ?query=`.
#[derive(Debug, Clone)]
pub struct HttpSparqlEndpoint {
    client: Client,
    url: String,
}

impl HttpSparqlEndpoint {
    /// Query the endpoint at `url`.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl SparqlEndpoint for HttpSparqlEndpoint {
    async fn select(&self, query: &str) -> Result<SparqlResults, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        if response.status().as_u16() >= 400 {
            return Err(error_from_response(response).await.into());
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        SparqlResults::parse(&self.url, body.to_vec())
    }
}
