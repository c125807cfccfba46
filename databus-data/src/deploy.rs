//! Register dataset documents with a Databus instance.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderName};
use thiserror::Error;

use crate::http::{TransportError, convert_reqwest_error};
use crate::webdav::API_KEY_HEADER;

/// Errors raised while deploying a dataset.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeployError {
    /// The Databus refused the document.
    #[error("deploy rejected with status {status}: {body}")]
    Rejected {
        /// Status returned.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The request could not be completed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Something that accepts DataID documents.
#[async_trait(?Send)]
pub trait DatasetDeployer {
    /// Submit `document`.
    async fn deploy(&self, document: &serde_json::Value) -> Result<(), DeployError>;
}

/// Publish endpoint of a Databus: `POST {base}/api/publish`.
#[derive(Debug, Clone)]
pub struct HttpDeployer {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpDeployer {
    /// Deploy to the Databus at `databus_base` as the owner of `api_key`.
    ///
    /// # Examples
    /// ```
    /// use databus_data::deploy::HttpDeployer;
    ///
    /// let deployer = HttpDeployer::new(reqwest::Client::new(), "https://databus.example.org/", "key");
    /// assert_eq!(deployer.url(), "https://databus.example.org/api/publish");
    /// ```
    pub fn new(client: Client, databus_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: format!("{}/api/publish", databus_base.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    /// Publish endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl DatasetDeployer for HttpDeployer {
    async fn deploy(&self, document: &serde_json::Value) -> Result<(), DeployError> {
        let response = self
            .client
            .post(&self.url)
            .header(HeaderName::from_static(API_KEY_HEADER), self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(document.to_string())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        if status >= 400 {
            return Err(DeployError::Rejected { status, body });
        }
        Ok(())
    }
}
