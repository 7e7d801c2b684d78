//! Blocking HTTP transport.

use crate::config::Config;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),
    /// The server answered with success but sent nothing.
    #[error("empty response body")]
    EmptyBody,
    #[error("request failed: {0}")]
    Request(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => TransportError::Status(code),
            other => TransportError::Request(other.to_string()),
        }
    }
}

/// Downloads a resource in one blocking call.
pub trait Transport: Send + Sync {
    /// Returns the body of a successful response. Any non-success status is
    /// an error.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// A ureq agent with the configured timeout.
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: build_agent(config.request_timeout()),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        log::debug!("[HTTP] GET {}", url);
        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()?;
        Ok(response.into_body().read_to_vec()?)
    }
}
