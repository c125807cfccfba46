//! Construction of the shared `reqwest` client.

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "databus-bridge/0.1";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3000;

/// Redirect hops followed when redirects are enabled.
const MAX_REDIRECTS: usize = 10;

/// Failure to construct the HTTP client.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {source}")]
pub struct ClientBuildError {
    #[from]
    source: reqwest::Error,
}

/// Settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Timeout applied to each request.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Whether redirects are followed.
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            follow_redirects: true,
        }
    }
}

impl HttpConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable following redirects.
    #[must_use]
    pub const fn with_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Build a client honouring these settings.
    ///
    /// # Examples
    /// ```
    /// use databus_data::http::HttpConfig;
    ///
    /// let client = HttpConfig::default().with_redirects(false).build();
    /// assert!(client.is_ok());
    /// ```
    pub fn build(&self) -> Result<Client, ClientBuildError> {
        let redirect = if self.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        Ok(Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .redirect(redirect)
            .build()?)
    }
}
