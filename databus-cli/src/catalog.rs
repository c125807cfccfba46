//! Catalog lookups: identifier completion, facet listing and search.

use std::io::Write;

use clap::Parser;
use databus_data::catalog::{
    Facet, HttpSparqlEndpoint, PartialIdentifier, SearchResult, SparqlEndpoint,
    complete_identifier, facet_values, search,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABUS, CliError, block_on, http_client, write_lines};

const ARG_ARTIFACT: &str = "artifact";
const ARG_FACET: &str = "facet";
const ARG_QUERY: &str = "query";
const ENV_DATABUS_FACETS: &str = "DATABUS_CMDS_FACETS_DATABUS";
const ENV_DATABUS_SEARCH: &str = "DATABUS_CMDS_SEARCH_DATABUS";
const ENV_ARTIFACT: &str = "DATABUS_CMDS_FACETS_ARTIFACT";
const ENV_FACET: &str = "DATABUS_CMDS_FACETS_FACET";

/// CLI arguments for the `complete` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Suggest completions for a partial Databus identifier")]
pub(crate) struct CompleteArgs {
    /// Identifier typed so far, e.g. `https://databus.dbpedia.org/dbpedia/`.
    #[arg(value_name = "partial")]
    pub(crate) partial: String,
}

pub(super) fn run_complete(args: CompleteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let partial = PartialIdentifier::parse(&args.partial);
    let endpoint = HttpSparqlEndpoint::new(http_client(true)?, partial.endpoint());
    run_complete_with(&partial, &endpoint, writer)
}

pub(super) fn run_complete_with(
    partial: &PartialIdentifier,
    endpoint: &dyn SparqlEndpoint,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let suggestions = block_on(complete_identifier(endpoint, partial))?;
    write_lines(writer, suggestions)
}

/// CLI arguments for the `facets` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the formats or versions published for an artifact")]
#[ortho_config(prefix = "DATABUS")]
pub(crate) struct FacetsArgs {
    /// Databus base URL; its `/sparql` endpoint is queried.
    #[arg(long = ARG_DATABUS, value_name = "url")]
    #[serde(default)]
    pub(crate) databus: Option<String>,
    /// Artifact identifier.
    #[arg(long = ARG_ARTIFACT, value_name = "uri")]
    #[serde(default)]
    pub(crate) artifact: Option<String>,
    /// `format` or `version`.
    #[arg(long = ARG_FACET, value_name = "name")]
    #[serde(default)]
    pub(crate) facet: Option<String>,
    /// Keep only values containing this text, ignoring case.
    #[arg(long, value_name = "text")]
    #[serde(default)]
    pub(crate) term: Option<String>,
}

/// Resolved `facets` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FacetsConfig {
    pub(crate) endpoint: String,
    pub(crate) artifact: String,
    pub(crate) facet: Facet,
    pub(crate) term: String,
}

pub(crate) fn parse_facet(raw: &str) -> Result<Facet, CliError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "format" => Ok(Facet::Format),
        "version" => Ok(Facet::Version),
        _ => Err(CliError::InvalidFacet {
            value: raw.to_owned(),
        }),
    }
}

fn sparql_endpoint(databus: &str) -> String {
    format!("{}/sparql", databus.trim_end_matches('/'))
}

impl TryFrom<FacetsArgs> for FacetsConfig {
    type Error = CliError;

    fn try_from(args: FacetsArgs) -> Result<Self, Self::Error> {
        let databus = args.databus.ok_or(CliError::MissingArgument {
            field: ARG_DATABUS,
            env: ENV_DATABUS_FACETS,
        })?;
        let artifact = args.artifact.ok_or(CliError::MissingArgument {
            field: ARG_ARTIFACT,
            env: ENV_ARTIFACT,
        })?;
        let facet = parse_facet(&args.facet.ok_or(CliError::MissingArgument {
            field: ARG_FACET,
            env: ENV_FACET,
        })?)?;
        Ok(Self {
            endpoint: sparql_endpoint(&databus),
            artifact,
            facet,
            term: args.term.unwrap_or_default(),
        })
    }
}

pub(super) fn run_facets(args: FacetsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = FacetsConfig::try_from(merged)?;
    let endpoint = HttpSparqlEndpoint::new(http_client(true)?, config.endpoint.clone());
    run_facets_with(&config, &endpoint, writer)
}

pub(super) fn run_facets_with(
    config: &FacetsConfig,
    endpoint: &dyn SparqlEndpoint,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let values = block_on(facet_values(
        endpoint,
        &config.artifact,
        config.facet,
        &config.term,
    ))??;
    write_lines(writer, values)
}

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Full-text search over a Databus")]
#[ortho_config(prefix = "DATABUS")]
pub(crate) struct SearchArgs {
    /// Databus base URL.
    #[arg(long = ARG_DATABUS, value_name = "url")]
    #[serde(default)]
    pub(crate) databus: Option<String>,
    /// Search text.
    #[arg(value_name = ARG_QUERY)]
    #[serde(default)]
    pub(crate) query: Option<String>,
}

pub(super) fn run_search(args: SearchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let databus = merged.databus.ok_or(CliError::MissingArgument {
        field: ARG_DATABUS,
        env: ENV_DATABUS_SEARCH,
    })?;
    let query = merged.query.unwrap_or_default();
    let client = http_client(true)?;
    let hits = block_on(search(&client, &databus, &query))??;
    write_lines(writer, hits.iter().map(search_line))
}

pub(crate) fn search_line(hit: &SearchResult) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        hit.type_name, hit.score, hit.label, hit.resource
    )
}
