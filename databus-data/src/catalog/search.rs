//! Full-text search through the Databus search API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::CatalogError;
use crate::http::{convert_reqwest_error, error_from_response};

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Kind of resource, e.g. `Artifact`.
    pub type_name: String,
    /// Relevance score.
    pub score: f64,
    /// Display label.
    pub label: String,
    /// Resource IRI.
    pub resource: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Score {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "typeName", default)]
    type_name: Vec<String>,
    #[serde(default)]
    score: Vec<Score>,
    #[serde(default)]
    label: Vec<String>,
    #[serde(default)]
    resource: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    docs: Vec<RawHit>,
}

fn first<T>(values: Vec<T>, field: &'static str) -> Result<T, CatalogError> {
    values
        .into_iter()
        .next()
        .ok_or(CatalogError::MissingField { field })
}

impl TryFrom<RawHit> for SearchResult {
    type Error = CatalogError;

    fn try_from(hit: RawHit) -> Result<Self, Self::Error> {
        let score = match first(hit.score, "score")? {
            Score::Number(value) => value,
            Score::Text(value) => value
                .trim()
                .parse()
                .map_err(|_| CatalogError::InvalidScore { value })?,
        };
        Ok(Self {
            type_name: first(hit.type_name, "typeName")?,
            score,
            label: first(hit.label, "label")?,
            resource: first(hit.resource, "resource")?,
        })
    }
}

/// URL of the search API of the Databus at `base` for `query`.
pub fn search_url(base: &str, query: &str) -> Result<Url, CatalogError> {
    let raw = format!("{}/api/search", base.trim_end_matches('/'));
    let mut url = Url::parse(&raw).map_err(|source| CatalogError::InvalidUrl { url: raw, source })?;
    url.query_pairs_mut().append_pair("query", query);
    Ok(url)
}

/// Decode a search API response received from `url`.
pub fn parse_search_response(
    url: &str,
    mut body: Vec<u8>,
) -> Result<Vec<SearchResult>, CatalogError> {
    let response: RawResponse =
        simd_json::serde::from_slice(&mut body).map_err(|source| CatalogError::Parse {
            url: url.to_owned(),
            source,
        })?;
    response.docs.into_iter().map(SearchResult::try_from).collect()
}

/// Search the Databus at `base` for `query`.
pub async fn search(
    client: &Client,
    base: &str,
    query: &str,
) -> Result<Vec<SearchResult>, CatalogError> {
    let url = search_url(base, query)?;
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|err| convert_reqwest_error(err, url.as_str()))?;
    if response.status().as_u16() >= 400 {
        return Err(error_from_response(response).await.into());
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| convert_reqwest_error(err, url.as_str()))?;
    parse_search_response(url.as_str(), body.to_vec())
}
