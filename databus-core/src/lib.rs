//! Core domain types for the Databus bridge.
//!
//! This crate holds everything that does not touch the network: chunking and
//! progress accounting for transfers, Databus identifiers and WebDAV paths,
//! publishing metadata, and the random value generator. Constructors return
//! `Result` so malformed configuration surfaces before any request is made.

mod chunk;
mod path;
mod progress;
mod publish;
mod random;

pub use chunk::{ChunkIter, ChunkSize, ChunkSizeError, DEFAULT_CHUNK_SIZE};
pub use path::{ArtifactUri, DavPath, MalformedPathError, RemotePath};
pub use progress::{
    FnProgress, LogProgress, ProgressSink, ProgressTracker, SharedProgress, TransferProgress,
    clock_symbol, shared_progress,
};
pub use publish::{
    ContentVariantError, ContentVariants, DATAID_CONTEXT, DEFAULT_FORMAT, DatasetDocument, DatasetMetadata,
    DatasetVersion, Distribution, KNOWN_LICENSES, MetadataError, abstract_from_description,
    known_licenses, target_file_name,
};
pub use random::{
    Entities, Entity, EntitySchema, RANDOM_PATH_PREFIX, RANDOM_ROW_TYPE, RandomValuesError,
    generate_random_values, generate_random_values_with,
};

pub mod test_support;
