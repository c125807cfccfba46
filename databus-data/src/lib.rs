//! Network adapters and pipelines for the Databus bridge.
//!
//! Responsibilities:
//! - Stream files from HTTP sources and SPARQL graph stores.
//! - Upload them into WebDAV storage, a graph store or a local file,
//!   reporting progress once per chunk.
//! - Look up Databus identifiers, facets and search hits.
//! - Publish a transferred file as a new Databus version.
//!
//! Boundaries:
//! - Identifiers, chunking and metadata rules live in `databus-core`.
//! - Every adapter receives its `reqwest::Client` explicitly; nothing here
//!   builds a runtime.
//!
//! Invariants:
//! - No step of a transfer is retried.
//! - A transfer ends in exactly one terminal state.

pub mod catalog;
pub mod deploy;
pub mod graph;
pub mod http;
pub mod publish;
pub mod transfer;
pub mod webdav;

#[doc(hidden)]
pub mod test_support;
