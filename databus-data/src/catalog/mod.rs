//! Read-only lookups against a Databus catalog: SPARQL listings,
//! identifier completion and full-text search.

mod complete;
mod endpoint;
mod error;
mod query;
mod search;

pub use complete::{CompletionLevel, PartialIdentifier, complete_identifier};
pub use endpoint::{HttpSparqlEndpoint, SPARQL_RESULTS_JSON, SparqlEndpoint, SparqlResults, SparqlTerm};
pub use error::CatalogError;
pub use query::{
    ACCOUNTS_QUERY, Facet, artifacts_query, facet_query, facet_values, file_lookup_query,
    files_query, find_files, groups_query, load_accounts, load_artifacts, load_files, load_groups,
    load_versions, versions_query,
};
pub use search::{SearchResult, parse_search_response, search, search_url};

#[cfg(test)]
mod tests;
