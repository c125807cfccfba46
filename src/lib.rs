//! Facade crate for the Databus bridge.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the network adapters and pipelines that load files from a
//! Databus, publish graphs to it and query its catalog.

#![forbid(unsafe_code)]

pub use databus_core::{
    ArtifactUri, ChunkIter, ChunkSize, ChunkSizeError, ContentVariants, DatasetMetadata,
    DatasetVersion, DavPath, Entities, LogProgress, MalformedPathError, ProgressSink,
    SharedProgress, TransferProgress, generate_random_values, shared_progress,
};

#[cfg(feature = "http")]
pub use databus_data::{catalog, deploy, graph, http, publish, transfer, webdav};
