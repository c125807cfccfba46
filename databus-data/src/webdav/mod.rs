//! WebDAV storage on a Databus instance.

mod ensure;
mod error;
mod store;

pub use ensure::{DavStatusPolicy, EnsureReport, ensure_directories};
pub use error::WebDavError;
pub use store::{API_KEY_HEADER, DavResponse, HttpWebDav, WebDavStore};
