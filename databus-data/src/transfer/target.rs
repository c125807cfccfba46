//! Destinations a transfer can write to.

use std::io::Write;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use databus_core::DavPath;
use databus_fs::{is_regular_file, stage_output_file};
use futures_util::StreamExt;
use log::debug;

use super::error::TransferError;
use crate::http::UploadBody;
use crate::webdav::{DavStatusPolicy, WebDavStore, ensure_directories};

/// Somewhere the bytes of a transfer end up.
///
/// `prepare` runs after the source has been opened successfully and before
/// any byte is written; `upload` consumes the whole body.
#[async_trait(?Send)]
pub trait TransferTarget {
    /// Human-readable location used in logs and errors.
    fn location(&self) -> String;

    /// Get the target ready to receive data.
    async fn prepare(&self) -> Result<(), TransferError>;

    /// Write the body to the target.
    async fn upload(&self, body: UploadBody) -> Result<(), TransferError>;
}

/// A file inside a WebDAV store, created together with its parent
/// collections.
#[derive(Debug)]
pub struct WebDavTarget<'a, S: ?Sized> {
    store: &'a S,
    path: DavPath,
    policy: DavStatusPolicy,
}

impl<'a, S: WebDavStore + ?Sized> WebDavTarget<'a, S> {
    /// Upload to `path` within `store`.
    pub fn new(store: &'a S, path: DavPath) -> Self {
        Self {
            store,
            path,
            policy: DavStatusPolicy::default(),
        }
    }

    /// Override which statuses count as "exists" and "created".
    #[must_use]
    pub fn with_policy(mut self, policy: DavStatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Absolute URL of the uploaded file.
    #[must_use]
    pub fn file_url(&self) -> String {
        self.store.file_url(&self.path)
    }
}

#[async_trait(?Send)]
impl<S: WebDavStore + ?Sized> TransferTarget for WebDavTarget<'_, S> {
    fn location(&self) -> String {
        self.file_url()
    }

    async fn prepare(&self) -> Result<(), TransferError> {
        if let Some(directory) = self.path.parent() {
            let report = ensure_directories(self.store, &directory, &self.policy).await?;
            debug!(
                "collections ready for {}: {} created, {} existing",
                self.path,
                report.created.len(),
                report.existing.len()
            );
        }
        Ok(())
    }

    async fn upload(&self, body: UploadBody) -> Result<(), TransferError> {
        let response = self
            .store
            .put(&self.path, body)
            .await
            .map_err(TransferError::from_target)?;
        if response.status >= 400 {
            return Err(TransferError::Upload {
                url: self.file_url(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

/// A local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    path: Utf8PathBuf,
    overwrite: bool,
}

impl FileTarget {
    /// Write to `path`, refusing to replace an existing file unless
    /// `overwrite` is set.
    pub fn new(path: impl Into<Utf8PathBuf>, overwrite: bool) -> Self {
        Self {
            path: path.into(),
            overwrite,
        }
    }

    fn write_error(&self, source: std::io::Error) -> TransferError {
        if source.kind() == std::io::ErrorKind::AlreadyExists {
            TransferError::TargetExists {
                path: self.path.clone(),
            }
        } else {
            TransferError::Write {
                path: self.path.clone(),
                source,
            }
        }
    }
}

#[async_trait(?Send)]
impl TransferTarget for FileTarget {
    fn location(&self) -> String {
        self.path.to_string()
    }

    async fn prepare(&self) -> Result<(), TransferError> {
        if self.overwrite {
            return Ok(());
        }
        match is_regular_file(&self.path) {
            Ok(false) => Ok(()),
            Ok(true) => Err(TransferError::TargetExists {
                path: self.path.clone(),
            }),
            Err(source) => Err(self.write_error(source)),
        }
    }

    async fn upload(&self, body: UploadBody) -> Result<(), TransferError> {
        // Dropping the staged file on an early return discards what was written.
        let mut file =
            stage_output_file(&self.path, self.overwrite).map_err(|err| self.write_error(err))?;
        let mut chunks = body.into_stream();
        while let Some(next) = chunks.next().await {
            let bytes = next.map_err(|err| self.write_error(err))?;
            file.write_all(&bytes).map_err(|err| self.write_error(err))?;
        }
        file.commit().map_err(|err| self.write_error(err))
    }
}
