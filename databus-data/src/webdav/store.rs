//! Minimal WebDAV operations and their HTTP implementation.

use std::io;

use async_trait::async_trait;
use databus_core::DavPath;
use reqwest::header::{CONTENT_LENGTH, HeaderName};
use reqwest::{Client, Method};
use url::Url;

use crate::http::{TransportError, UploadBody, convert_reqwest_error};

/// Header carrying the Databus API key (`X-API-KEY`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Status and body of a WebDAV response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// The WebDAV requests needed to upload a file into nested collections.
///
/// Paths are relative to the store's root. Collection paths are given
/// without a trailing slash; implementations add one when addressing a
/// collection.
#[async_trait(?Send)]
pub trait WebDavStore {
    /// Absolute URL of a collection.
    fn collection_url(&self, collection: &str) -> String;

    /// Absolute URL of a file.
    fn file_url(&self, path: &DavPath) -> String;

    /// Issue `HEAD` against a collection and return the status.
    async fn probe(&self, collection: &str) -> Result<u16, TransportError>;

    /// Issue `MKCOL` for a collection.
    async fn make_collection(&self, collection: &str) -> Result<DavResponse, TransportError>;

    /// `PUT` a file.
    async fn put(&self, path: &DavPath, body: UploadBody) -> Result<DavResponse, TransportError>;
}

/// WebDAV space of one Databus account: `{databus}/dav/{user}/`.
#[derive(Debug, Clone)]
pub struct HttpWebDav {
    client: Client,
    dav_base: String,
    api_key: String,
}

impl HttpWebDav {
    /// Address the space of `user` on the Databus at `databus_base`.
    ///
    /// # Examples
    /// ```
    /// use databus_core::DavPath;
    /// use databus_data::webdav::{HttpWebDav, WebDavStore};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dav = HttpWebDav::new(reqwest::Client::new(), "https://databus.example.org/", "alice", "key");
    /// assert_eq!(dav.collection_url("a/b"), "https://databus.example.org/dav/alice/a/b/");
    /// let file = DavPath::parse("a/b/c.ttl")?;
    /// assert_eq!(dav.file_url(&file), "https://databus.example.org/dav/alice/a/b/c.ttl");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        client: Client,
        databus_base: &str,
        user: &str,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            dav_base: format!("{}/dav/{user}/", databus_base.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    /// Root URL of the space, ending in `/`.
    #[must_use]
    pub fn dav_base(&self) -> &str {
        &self.dav_base
    }

    /// Join percent-encoded `segments` onto the space root.
    fn encoded_url<'s>(&self, segments: impl Iterator<Item = &'s str>, collection: bool) -> String {
        let Ok(mut url) = Url::parse(&self.dav_base) else {
            let joined: Vec<&str> = segments.collect();
            let slash = if collection { "/" } else { "" };
            return format!("{}{}{slash}", self.dav_base, joined.join("/"));
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
            if collection {
                path.push("");
            }
        }
        url.into()
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<DavResponse, TransportError> {
        let response = request
            .header(HeaderName::from_static(API_KEY_HEADER), self.api_key.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?;
        Ok(DavResponse { status, body })
    }
}

#[async_trait(?Send)]
impl WebDavStore for HttpWebDav {
    fn collection_url(&self, collection: &str) -> String {
        self.encoded_url(collection.split('/'), true)
    }

    fn file_url(&self, path: &DavPath) -> String {
        self.encoded_url(path.segments(), false)
    }

    async fn probe(&self, collection: &str) -> Result<u16, TransportError> {
        let url = self.collection_url(collection);
        self.client
            .head(&url)
            .send()
            .await
            .map(|response| response.status().as_u16())
            .map_err(|err| convert_reqwest_error(err, &url))
    }

    async fn make_collection(&self, collection: &str) -> Result<DavResponse, TransportError> {
        let url = self.collection_url(collection);
        let method =
            Method::from_bytes(b"MKCOL").map_err(|err| TransportError::Network {
                url: url.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, err),
            })?;
        self.send(self.client.request(method, &url), &url).await
    }

    async fn put(&self, path: &DavPath, body: UploadBody) -> Result<DavResponse, TransportError> {
        let url = self.file_url(path);
        let mut request = self.client.put(&url);
        if let Some(length) = body.length() {
            request = request.header(CONTENT_LENGTH, length);
        }
        self.send(request.body(body.into_reqwest()), &url).await
    }
}
