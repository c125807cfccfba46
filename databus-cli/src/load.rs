//! `load` command: copy a Databus file into a graph store or a local file.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use databus_core::{ChunkSize, LogProgress, shared_progress};
use databus_data::graph::GraphStoreTarget;
use databus_data::http::{ByteSource, HttpSource};
use databus_data::transfer::{
    BufferMode, FileTarget, TransferOutcome, TransferRequest, TransferTarget, run_transfer,
};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_CHUNK_SIZE, ARG_GRAPH, ARG_GRAPH_ENDPOINT, CliError, block_on, http_client};

pub(crate) const ARG_FILE_ID: &str = "file-id";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_FILE_ID: &str = "DATABUS_CMDS_LOAD_FILE_ID";
pub(crate) const ENV_GRAPH: &str = "DATABUS_CMDS_LOAD_GRAPH";
pub(crate) const ENV_GRAPH_ENDPOINT: &str = "DATABUS_CMDS_LOAD_GRAPH_ENDPOINT";

/// CLI arguments for the `load` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download a Databus file and write it into a named graph of a \
                 SPARQL graph store, replacing its contents, or into a local \
                 file. The file is moved in chunks with progress logged once \
                 per chunk.",
    about = "Copy a Databus file into a graph store or a local file"
)]
#[ortho_config(prefix = "DATABUS")]
pub(crate) struct LoadArgs {
    /// Databus file identifier (download URL).
    #[arg(long = ARG_FILE_ID, value_name = "uri")]
    #[serde(default)]
    pub(crate) file_id: Option<String>,
    /// IRI of the graph to replace.
    #[arg(long = ARG_GRAPH, value_name = "iri")]
    #[serde(default)]
    pub(crate) graph: Option<String>,
    /// Graph store protocol endpoint.
    #[arg(long = ARG_GRAPH_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) graph_endpoint: Option<String>,
    /// Write to this local file instead of a graph store.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Chunk size in bytes (default 1 MiB).
    #[arg(long = ARG_CHUNK_SIZE, value_name = "bytes")]
    #[serde(default)]
    pub(crate) chunk_size: Option<usize>,
    /// Download the whole file before uploading it.
    #[arg(long)]
    #[serde(default)]
    pub(crate) buffer_in_memory: bool,
    /// Do not follow redirects when downloading.
    #[arg(long)]
    #[serde(default)]
    pub(crate) no_redirects: bool,
    /// Bearer token sent to the graph store.
    #[arg(long, value_name = "token")]
    #[serde(default)]
    pub(crate) token: Option<String>,
    /// Replace an existing output file.
    #[arg(long)]
    #[serde(default)]
    pub(crate) overwrite: bool,
}

impl LoadArgs {
    pub(crate) fn into_config(self) -> Result<LoadConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoadConfig::try_from(merged)
    }
}

/// Where a loaded file ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadDestination {
    /// A named graph, replaced with the file contents.
    GraphStore { endpoint: String, graph: String },
    /// A local file.
    File { path: Utf8PathBuf, overwrite: bool },
}

/// Resolved `load` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadConfig {
    pub(crate) file_id: String,
    pub(crate) destination: LoadDestination,
    pub(crate) request: TransferRequest,
    pub(crate) follow_redirects: bool,
    pub(crate) token: Option<String>,
}

impl TryFrom<LoadArgs> for LoadConfig {
    type Error = CliError;

    fn try_from(args: LoadArgs) -> Result<Self, Self::Error> {
        let file_id = args.file_id.ok_or(CliError::MissingArgument {
            field: ARG_FILE_ID,
            env: ENV_FILE_ID,
        })?;
        let destination = match (args.output, args.graph) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_OUTPUT,
                    second: ARG_GRAPH,
                });
            }
            (Some(path), None) => LoadDestination::File {
                path,
                overwrite: args.overwrite,
            },
            (None, graph) => LoadDestination::GraphStore {
                graph: graph.ok_or(CliError::MissingArgument {
                    field: ARG_GRAPH,
                    env: ENV_GRAPH,
                })?,
                endpoint: args.graph_endpoint.ok_or(CliError::MissingArgument {
                    field: ARG_GRAPH_ENDPOINT,
                    env: ENV_GRAPH_ENDPOINT,
                })?,
            },
        };
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
            file_id,
            destination,
            request: TransferRequest { chunk_size, mode },
            follow_redirects: !args.no_redirects,
            token: args.token,
        })
    }
}

pub(super) fn run_load(args: LoadArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    debug!("loading {} into {:?}", config.file_id, config.destination);
    let client = http_client(config.follow_redirects)?;
    let source = HttpSource::new(client.clone(), config.file_id.clone());
    let target: Box<dyn TransferTarget> = match &config.destination {
        LoadDestination::GraphStore { endpoint, graph } => Box::new(
            GraphStoreTarget::new(client, endpoint, graph)?.with_token(config.token.clone()),
        ),
        LoadDestination::File { path, overwrite } => {
            Box::new(FileTarget::new(path.clone(), *overwrite))
        }
    };
    run_load_with(&config, &source, target.as_ref(), writer)
}

/// Run a resolved load against explicit source and target adapters.
pub(super) fn run_load_with(
    config: &LoadConfig,
    source: &dyn ByteSource,
    target: &dyn TransferTarget,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let progress = shared_progress(LogProgress);
    let outcome = block_on(run_transfer(source, target, config.request, progress))?;
    let state = outcome.state();
    match outcome {
        TransferOutcome::Success(report) => writeln!(
            writer,
            "loaded {} bytes from {} into {} (sha256 {})",
            report.bytes,
            source.location(),
            target.location(),
            report.sha256
        )
        .map_err(CliError::WriteOutput),
        TransferOutcome::DownloadFailed { message } | TransferOutcome::UploadFailed { message } => {
            Err(CliError::TransferFailed { state, message })
        }
    }
}
