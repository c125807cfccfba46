//! Query templates over the DataID vocabulary and the lookups built on
//! them.

use log::debug;

use super::endpoint::SparqlEndpoint;
use super::error::CatalogError;

const PREFIXES: &str = "PREFIX dct: <http://purl.org/dc/terms/>\n\
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
PREFIX dataid: <http://dataid.dbpedia.org/ns/core#>\n\
PREFIX dcat: <http://www.w3.org/ns/dcat#>\n";

/// Lists registered accounts.
pub const ACCOUNTS_QUERY: &str = "PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n\
\n\
SELECT DISTINCT ?acc WHERE {\n  ?acc a foaf:PersonalProfileDocument .\n} ";

/// A searchable property of an artifact's versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// File format extension of a distribution.
    Format,
    /// Version label of a dataset.
    Version,
}

impl Facet {
    const fn pattern(self) -> &'static str {
        match self {
            Self::Format => "?dataset dcat:distribution ?dist .\n?dist dataid:formatExtension ?facet .",
            Self::Version => "?dataset dct:hasVersion ?facet .",
        }
    }
}

/// Reject identifiers that would break out of an `<...>` IRI reference.
fn iri(candidate: &str) -> Result<String, CatalogError> {
    let forbidden = |c: char| c.is_whitespace() || "<>\"{}|^`\\".contains(c);
    if candidate.is_empty() || candidate.contains(forbidden) {
        return Err(CatalogError::InvalidIri {
            iri: candidate.to_owned(),
        });
    }
    Ok(format!("<{candidate}>"))
}

/// Quote `raw` as a SPARQL string literal.
fn literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().saturating_add(2));
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Groups owned by `publisher`. The publisher IRI carries the `#this`
/// fragment.
pub fn groups_query(publisher: &str) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?group WHERE {{\n?dataset a dataid:Dataset .\n?dataset dct:publisher {} .\n?dataset dataid:group ?group .}}",
        iri(publisher)?
    ))
}

/// Artifacts of `group`.
pub fn artifacts_query(group: &str) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?artifact WHERE {{\n?dataset dataid:group {} .\n?dataset dataid:artifact ?artifact .}}",
        iri(group)?
    ))
}

/// Versions of `artifact`.
pub fn versions_query(artifact: &str) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?version WHERE {{\n?dataset dataid:artifact {} .\n?dataset dataid:version ?version .}}",
        iri(artifact)?
    ))
}

/// Files of `version`.
pub fn files_query(version: &str) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?file WHERE {{\n?dataset dataid:version {} .\n?dataset dcat:distribution ?dist .\n?dist dataid:file ?file. }}",
        iri(version)?
    ))
}

/// Distinct values of `facet` across the versions of `artifact`.
pub fn facet_query(artifact: &str, facet: Facet) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?facet WHERE {{\n?dataset dataid:artifact {} .\n{}}}",
        iri(artifact)?,
        facet.pattern()
    ))
}

/// Files of `artifact` in a given `version` and `format`.
pub fn file_lookup_query(
    artifact: &str,
    version: &str,
    format: &str,
) -> Result<String, CatalogError> {
    Ok(format!(
        "{PREFIXES}SELECT DISTINCT ?file WHERE {{\n?dataset dataid:artifact {} .\n?dataset dct:hasVersion {} .\n?dataset dcat:distribution ?dist .\n?dist dataid:formatExtension {} .\n?dist dataid:file ?file .}}",
        iri(artifact)?,
        literal(version),
        literal(format)
    ))
}

async fn values<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    query: &str,
    key: &str,
) -> Result<Vec<String>, CatalogError> {
    debug!("running SPARQL query for ?{key}");
    Ok(endpoint.select(query).await?.values_for_key(key))
}

/// Registered accounts.
pub async fn load_accounts<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, ACCOUNTS_QUERY, "acc").await
}

/// Groups of a publisher.
pub async fn load_groups<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    publisher: &str,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, &groups_query(publisher)?, "group").await
}

/// Artifacts of a group.
pub async fn load_artifacts<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    group: &str,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, &artifacts_query(group)?, "artifact").await
}

/// Versions of an artifact.
pub async fn load_versions<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    artifact: &str,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, &versions_query(artifact)?, "version").await
}

/// Files of a version.
pub async fn load_files<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    version: &str,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, &files_query(version)?, "file").await
}

/// Files of an artifact matching a version and format.
pub async fn find_files<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    artifact: &str,
    version: &str,
    format: &str,
) -> Result<Vec<String>, CatalogError> {
    values(endpoint, &file_lookup_query(artifact, version, format)?, "file").await
}

/// Values of `facet` for `artifact` containing `term`, ignoring case.
///
/// An empty term keeps every value.
pub async fn facet_values<E: SparqlEndpoint + ?Sized>(
    endpoint: &E,
    artifact: &str,
    facet: Facet,
    term: &str,
) -> Result<Vec<String>, CatalogError> {
    let needle = term.to_lowercase();
    let found = values(endpoint, &facet_query(artifact, facet)?, "facet").await?;
    Ok(found
        .into_iter()
        .filter(|value| value.to_lowercase().contains(&needle))
        .collect())
}
