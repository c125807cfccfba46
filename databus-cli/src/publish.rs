//! `publish` command: transfer a graph into a Databus and deploy its DataID.

use std::io::Write;

use clap::Parser;
use databus_core::{
    ArtifactUri, ChunkSize, ContentVariants, DEFAULT_FORMAT, DatasetMetadata, DatasetVersion,
    LogProgress, shared_progress,
};
use databus_data::deploy::{DatasetDeployer, HttpDeployer};
use databus_data::graph::graph_source;
use databus_data::http::ByteSource;
use databus_data::publish::{PublishRequest, publish};
use databus_data::transfer::{BufferMode, TransferRequest};
use databus_data::webdav::{HttpWebDav, WebDavStore};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_CHUNK_SIZE, ARG_GRAPH, ARG_GRAPH_ENDPOINT, CliError, block_on, http_client};

pub(crate) const ARG_ARTIFACT_URI: &str = "artifact-uri";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_LICENSE: &str = "license";
pub(crate) const ARG_TITLE: &str = "title";
pub(crate) const ARG_DESCRIPTION: &str = "description";
const ENV_ARTIFACT_URI: &str = "DATABUS_CMDS_PUBLISH_ARTIFACT_URI";
const ENV_API_KEY: &str = "DATABUS_CMDS_PUBLISH_API_KEY";
const ENV_LICENSE: &str = "DATABUS_CMDS_PUBLISH_LICENSE";
const ENV_GRAPH: &str = "DATABUS_CMDS_PUBLISH_GRAPH";
const ENV_GRAPH_ENDPOINT: &str = "DATABUS_CMDS_PUBLISH_GRAPH_ENDPOINT";
const ENV_TITLE: &str = "DATABUS_CMDS_PUBLISH_TITLE";
const ENV_DESCRIPTION: &str = "DATABUS_CMDS_PUBLISH_DESCRIPTION";

/// CLI arguments for the `publish` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a named graph from a graph store, upload it into the \
                 publisher's WebDAV space on the Databus and deploy a DataID \
                 document describing the new version. The version defaults to \
                 today's date.",
    about = "Publish a graph as a new version of a Databus artifact"
)]
#[ortho_config(prefix = "DATABUS")]
pub(crate) struct PublishArgs {
    /// Artifact identifier, `https://host/publisher/group/artifact`.
    #[arg(long = ARG_ARTIFACT_URI, value_name = "uri")]
    #[serde(default)]
    pub(crate) artifact_uri: Option<String>,
    /// Databus API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Licence URI of the dataset.
    #[arg(long = ARG_LICENSE, value_name = "uri")]
    #[serde(default)]
    pub(crate) license: Option<String>,
    /// IRI of the graph to publish.
    #[arg(long = ARG_GRAPH, value_name = "iri")]
    #[serde(default)]
    pub(crate) graph: Option<String>,
    /// Graph store protocol endpoint serving the graph.
    #[arg(long = ARG_GRAPH_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) graph_endpoint: Option<String>,
    /// Dataset title.
    #[arg(long = ARG_TITLE, value_name = "text")]
    #[serde(default)]
    pub(crate) title: Option<String>,
    /// Dataset description; its first sentence becomes the abstract.
    #[arg(long = ARG_DESCRIPTION, value_name = "text")]
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Version label (defaults to today as YYYY.MM.DD).
    #[arg(long, value_name = "label")]
    #[ortho_config(cli_long = "version-label")]
    #[serde(default)]
    pub(crate) version: Option<String>,
    /// Content variants as `key=value,...`.
    #[arg(long, value_name = "variants")]
    #[serde(default)]
    pub(crate) cvs: Option<String>,
    /// File extension of the published file.
    #[arg(long, value_name = "ext")]
    #[serde(default)]
    pub(crate) format: Option<String>,
    /// Chunk size in bytes (default 1 MiB).
    #[arg(long = ARG_CHUNK_SIZE, value_name = "bytes")]
    #[serde(default)]
    pub(crate) chunk_size: Option<usize>,
    /// Bearer token sent to the graph store.
    #[arg(long, value_name = "token")]
    #[serde(default)]
    pub(crate) token: Option<String>,
    /// Download the whole graph before uploading it.
    #[arg(long)]
    #[serde(default)]
    pub(crate) buffer_in_memory: bool,
}

impl PublishArgs {
    pub(crate) fn into_config(self) -> Result<PublishConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PublishConfig::try_from(merged)
    }
}

/// Resolved `publish` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublishConfig {
    pub(crate) api_key: String,
    pub(crate) graph: String,
    pub(crate) graph_endpoint: String,
    pub(crate) token: Option<String>,
    pub(crate) request: PublishRequest,
}

fn required(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<String, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

impl TryFrom<PublishArgs> for PublishConfig {
    type Error = CliError;

    fn try_from(args: PublishArgs) -> Result<Self, Self::Error> {
        let artifact = ArtifactUri::parse(&required(
            args.artifact_uri,
            ARG_ARTIFACT_URI,
            ENV_ARTIFACT_URI,
        )?)?;
        let api_key = required(args.api_key, ARG_API_KEY, ENV_API_KEY)?;
        let graph = required(args.graph, ARG_GRAPH, ENV_GRAPH)?;
        let graph_endpoint = required(args.graph_endpoint, ARG_GRAPH_ENDPOINT, ENV_GRAPH_ENDPOINT)?;
        let metadata = DatasetMetadata::new(
            required(args.title, ARG_TITLE, ENV_TITLE)?,
            required(args.description, ARG_DESCRIPTION, ENV_DESCRIPTION)?,
            required(args.license, ARG_LICENSE, ENV_LICENSE)?,
        )?;
        let content_variants = ContentVariants::parse(args.cvs.as_deref().unwrap_or_default())?;
        let chunk_size = args
            .chunk_size
            .map(ChunkSize::new)
            .transpose()?
            .unwrap_or_default();
        let mode = if args.buffer_in_memory {
            BufferMode::InMemory
        } else {
            BufferMode::Streaming
        };
        Ok(Self {
            api_key,
            graph,
            graph_endpoint,
            token: args.token,
            request: PublishRequest {
                artifact,
                version: DatasetVersion::resolve_today(args.version.as_deref()),
                content_variants,
                format: args.format.unwrap_or_else(|| DEFAULT_FORMAT.to_owned()),
                metadata,
                transfer: TransferRequest { chunk_size, mode },
            },
        })
    }
}

pub(super) fn run_publish(args: PublishArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    debug!("publishing to {}", config.request.artifact);
    let client = http_client(true)?;
    let source = graph_source(
        client.clone(),
        &config.graph_endpoint,
        &config.graph,
        config.token.clone(),
    )?;
    let artifact = &config.request.artifact;
    let store = HttpWebDav::new(
        client.clone(),
        artifact.base(),
        artifact.publisher(),
        config.api_key.clone(),
    );
    let deployer = HttpDeployer::new(client, artifact.base(), config.api_key.clone());
    run_publish_with(&config.request, &source, &store, &deployer, writer)
}

/// Publish against explicit adapters and report the new version.
pub(super) fn run_publish_with(
    request: &PublishRequest,
    source: &dyn ByteSource,
    store: &dyn WebDavStore,
    deployer: &dyn DatasetDeployer,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let progress = shared_progress(LogProgress);
    let report = block_on(publish(source, store, deployer, request, progress))??;
    writeln!(
        writer,
        "{}\n{}",
        request.artifact.version_id(request.version.as_str()),
        report.distribution.download_url
    )
    .map_err(CliError::WriteOutput)
}
