//! Error types emitted by the Databus CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use databus_core::{
    ChunkSizeError, ContentVariantError, MalformedPathError, MetadataError, RandomValuesError,
};
use databus_data::catalog::CatalogError;
use databus_data::graph::GraphStoreError;
use databus_data::http::ClientBuildError;
use databus_data::publish::PublishError;
use databus_data::transfer::TerminalState;
use thiserror::Error;

/// Errors emitted by the Databus CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Two mutually exclusive options were both given.
    #[error("--{first} cannot be combined with --{second}")]
    ConflictingArguments {
        /// First conflicting option.
        first: &'static str,
        /// Second conflicting option.
        second: &'static str,
    },
    /// The chunk size is not usable.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(#[from] ChunkSizeError),
    /// The artifact identifier is malformed.
    #[error("invalid artifact URI: {0}")]
    InvalidArtifact(#[from] MalformedPathError),
    /// The content variant list is malformed.
    #[error("invalid content variants: {0}")]
    InvalidContentVariants(#[from] ContentVariantError),
    /// Title, description or licence is missing.
    #[error("invalid dataset metadata: {0}")]
    InvalidMetadata(#[from] MetadataError),
    /// The facet name is unknown.
    #[error("unknown facet {value:?} (expected format or version)")]
    InvalidFacet {
        /// The rejected facet name.
        value: String,
    },
    /// The random value counts are not usable.
    #[error(transparent)]
    RandomValues(#[from] RandomValuesError),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The HTTP client could not be built.
    #[error(transparent)]
    HttpClient(#[from] ClientBuildError),
    /// The graph store endpoint is malformed.
    #[error(transparent)]
    GraphStore(#[from] GraphStoreError),
    /// The transfer ended in a failure state.
    #[error("{message}")]
    TransferFailed {
        /// Terminal state the transfer ended in.
        state: TerminalState,
        /// Failure description.
        message: String,
    },
    /// Publishing failed.
    #[error("failed to publish: {0}")]
    Publish(#[from] PublishError),
    /// A catalog lookup failed.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
