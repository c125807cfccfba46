//! Create the collections leading up to an upload path.

use databus_core::DavPath;
use log::{debug, info};

use super::error::WebDavError;
use super::store::WebDavStore;

/// Which statuses count as "already exists" and "created".
///
/// # Examples
/// ```
/// use databus_data::webdav::DavStatusPolicy;
///
/// let policy = DavStatusPolicy::default();
/// assert!(policy.exists(405));
/// assert!(policy.created(201));
/// assert!(!policy.created(403));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavStatusPolicy {
    exists: Vec<u16>,
    created: Vec<u16>,
}

impl Default for DavStatusPolicy {
    fn default() -> Self {
        Self {
            exists: vec![200, 405],
            created: vec![200, 201, 405],
        }
    }
}

impl DavStatusPolicy {
    /// Replace the probe statuses meaning "collection exists".
    #[must_use]
    pub fn with_exists(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.exists = statuses.into_iter().collect();
        self
    }

    /// Replace the `MKCOL` statuses meaning "collection is now present".
    #[must_use]
    pub fn with_created(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.created = statuses.into_iter().collect();
        self
    }

    /// Whether a probe status means the collection exists.
    #[must_use]
    pub fn exists(&self, status: u16) -> bool {
        self.exists.contains(&status)
    }

    /// Whether an `MKCOL` status means the collection is now present.
    #[must_use]
    pub fn created(&self, status: u16) -> bool {
        self.created.contains(&status)
    }
}

/// Collections visited by [`ensure_directories`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureReport {
    /// Collections that were created, in order.
    pub created: Vec<String>,
    /// Collections that already existed.
    pub existing: Vec<String>,
}

/// Make sure every prefix of `directory` exists, left to right.
///
/// Each prefix is probed first and only created when the probe does not
/// report it as present. A probe that fails at the transport level is
/// treated as "absent". The first `MKCOL` answered with a status outside
/// the policy aborts the walk; collections created up to that point are
/// left in place.
pub async fn ensure_directories<S: WebDavStore + ?Sized>(
    store: &S,
    directory: &DavPath,
    policy: &DavStatusPolicy,
) -> Result<EnsureReport, WebDavError> {
    let mut report = EnsureReport::default();
    for collection in directory.prefixes() {
        let present = match store.probe(&collection).await {
            Ok(status) => policy.exists(status),
            Err(err) => {
                debug!("existence probe for {collection} failed, assuming absent: {err}");
                false
            }
        };
        if present {
            report.existing.push(collection);
            continue;
        }
        let response = store.make_collection(&collection).await?;
        if !policy.created(response.status) {
            return Err(WebDavError::DirectoryCreation {
                method: "MKCOL".to_owned(),
                url: store.collection_url(&collection),
                status: response.status,
                body: response.body,
            });
        }
        info!("created collection {}", store.collection_url(&collection));
        report.created.push(collection);
    }
    Ok(report)
}
