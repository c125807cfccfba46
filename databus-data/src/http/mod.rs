//! HTTP plumbing shared by sources, targets and catalog lookups.
//!
//! A single [`reqwest::Client`] is built from [`HttpConfig`] and passed to
//! every adapter explicitly.

mod client;
mod error;
mod rechunk;
mod source;

pub use client::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpConfig};
pub use error::TransportError;
pub(crate) use error::{convert_reqwest_error, error_from_response};
pub use rechunk::Rechunk;
pub use source::{ByteSource, ByteStream, HttpSource, UploadBody};
