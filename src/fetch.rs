use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Source of raw page text for a run.
pub trait Fetch {
    fn fetch(&self, address: &str) -> Result<String, FetchError>;
}

/// Plain blocking GET. No retries; a request with no timeout configured
/// waits as long as the server does.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, address: &str) -> Result<String, FetchError> {
        info!("Fetching {}", address);
        let transport = |source| FetchError::Transport {
            url: address.to_string(),
            source,
        };

        let response = self.client.get(address).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: address.to_string(),
                status,
            });
        }
        let body = response.text().map_err(transport)?;
        info!("Fetched {} bytes from {}", body.len(), address);
        Ok(body)
    }
}
