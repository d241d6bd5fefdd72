//! Byte fetcher: turns a URL into the complete response body
//!
//! Used by both the gallery listing and the thumbnail worker. There is no
//! retry policy here; a failed fetch is reported to the caller, which decides
//! whether to ask again.

use crate::config::FetchConfig;
use crate::error::{Error, NetworkError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Source of raw bytes for a URL
///
/// Implemented by [`HttpFetcher`] for real traffic. The engine only talks to
/// this trait, so tests and embedders can substitute their own source.
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    /// Fetch the full body behind `url`
    ///
    /// Fails with [`NetworkError`] when the server does not answer `200 OK` or
    /// the transfer breaks.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetch `url` and interpret the body as (lossy) UTF-8 text
    async fn fetch_string(&self, url: &str) -> Result<String> {
        let bytes = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// reqwest-backed [`ByteFetcher`]
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeouts and user agent
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
        })
    }

    /// The configured limit that can have expired in the given phase
    ///
    /// While connecting, whichever of the connect and request timeouts is
    /// shorter fires first.
    fn expired_limit(&self, connecting: bool) -> Option<Duration> {
        match (connecting, self.connect_timeout, self.timeout) {
            (true, Some(connect), Some(total)) => Some(connect.min(total)),
            (true, Some(connect), None) => Some(connect),
            (_, _, total) => total,
        }
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> NetworkError {
        let expired = if e.is_timeout() {
            self.expired_limit(e.is_connect())
        } else {
            None
        };

        match expired {
            Some(timeout) => NetworkError::Timeout {
                url: url.to_string(),
                timeout,
            },
            None => NetworkError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = url::Url::parse(url).map_err(|e| NetworkError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        // The response (and its pooled connection) is released on every return path
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        if response.status() != StatusCode::OK {
            tracing::debug!(url = %url, status = %response.status(), "non-OK response");
            return Err(NetworkError::Status {
                status: response.status().to_string(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        tracing::trace!(url = %url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
