//! Failures of catalog lookups.

use thiserror::Error;

use crate::http::TransportError;

/// Errors raised while querying a Databus catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// The request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response was not the expected JSON.
    #[error("failed to parse response from {url}: {source}")]
    Parse {
        /// Request URL.
        url: String,
        /// Parser failure.
        #[source]
        source: simd_json::Error,
    },
    /// An identifier cannot be embedded in a query as an IRI.
    #[error("not a valid IRI: {iri}")]
    InvalidIri {
        /// Offending identifier.
        iri: String,
    },
    /// A base URL could not be parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// URL as supplied.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// A search hit lacks a required field.
    #[error("search result has no {field}")]
    MissingField {
        /// Field name as sent by the server.
        field: &'static str,
    },
    /// A search score is neither a number nor a numeric string.
    #[error("search score {value} is not a number")]
    InvalidScore {
        /// Score as sent by the server.
        value: String,
    },
}
