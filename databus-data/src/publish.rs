//! Publish a graph as a new Databus version.
//!
//! The file is transferred into the publisher's WebDAV space under
//! `group/artifact/version/{artifact}_{variants}.{format}`, and the DataID
//! document describing it (download URL, checksum and size of the uploaded
//! bytes) is then deployed.

use databus_core::{
    ArtifactUri, ContentVariants, DatasetDocument, DatasetMetadata, DatasetVersion, Distribution,
    MalformedPathError, SharedProgress, target_file_name,
};
use log::info;
use thiserror::Error;

use crate::deploy::{DatasetDeployer, DeployError};
use crate::http::ByteSource;
use crate::transfer::{TransferError, TransferReport, TransferRequest, WebDavTarget, transfer};
use crate::webdav::WebDavStore;

/// Errors raised while publishing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The upload path could not be built from the artifact and version.
    #[error("invalid upload path: {0}")]
    Path(#[from] MalformedPathError),
    /// Moving the file failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// The Databus refused the dataset document.
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Everything needed to publish one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Artifact receiving the new version.
    pub artifact: ArtifactUri,
    /// Version label.
    pub version: DatasetVersion,
    /// Variants distinguishing the file.
    pub content_variants: ContentVariants,
    /// File extension.
    pub format: String,
    /// Title, description and licence.
    pub metadata: DatasetMetadata,
    /// Chunking and buffering.
    pub transfer: TransferRequest,
}

/// What a successful publish produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// The deployed DataID document.
    pub document: serde_json::Value,
    /// The published file.
    pub distribution: Distribution,
    /// Transfer totals.
    pub transfer: TransferReport,
}

/// Transfer `source` into `store` and deploy its description.
///
/// Nothing is deployed when the transfer fails.
pub async fn publish<S, W, D>(
    source: &S,
    store: &W,
    deployer: &D,
    request: &PublishRequest,
    progress: SharedProgress,
) -> Result<PublishReport, PublishError>
where
    S: ByteSource + ?Sized,
    W: WebDavStore + ?Sized,
    D: DatasetDeployer + ?Sized,
{
    let file_name = target_file_name(
        request.artifact.artifact(),
        &request.content_variants,
        &request.format,
    );
    let remote = request
        .artifact
        .remote_path(request.version.as_str(), &file_name)?;
    let version_id = remote.version_id();
    let target = WebDavTarget::new(store, remote.dav_path().clone());
    info!("Publishing {} as {version_id}", source.location());

    let report = transfer(source, &target, request.transfer, progress).await?;
    let distribution = Distribution {
        download_url: target.file_url(),
        format: request.format.clone(),
        content_variants: request.content_variants.clone(),
        sha256sum: report.sha256.clone(),
        byte_size: report.bytes,
    };
    let document = DatasetDocument {
        version_id: version_id.clone(),
        metadata: request.metadata.clone(),
        distributions: vec![distribution.clone()],
    }
    .to_jsonld();
    deployer.deploy(&document).await?;
    info!("Successfully deployed {version_id}");
    Ok(PublishReport {
        document,
        distribution,
        transfer: report,
    })
}
