//! Resource acquisition: fetching the real implementation over the network.

use crate::error::LoadError;
use crate::target::ScriptSource;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A fetched build of the real implementation, ready to be evaluated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedScript {
    pub source: ScriptSource,
    pub body: String,
}

/// Boundary to the host's network/script-injection machinery.
#[async_trait]
pub trait ResourceAcquirer: Send + Sync {
    /// Fetch the script described by `source`.
    async fn acquire(&self, source: &ScriptSource) -> Result<LoadedScript, LoadError>;
}

const SCRIPT_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn map_http_error(url: &str, error: reqwest::Error) -> LoadError {
    if error.is_connect() {
        LoadError::acquisition(url, format!("Connection error: {}", error))
    } else if error.is_timeout() {
        LoadError::acquisition(url, format!("Request timeout: {}", error))
    } else {
        LoadError::acquisition(url, format!("HTTP error: {}", error))
    }
}

/// Fetches scripts with `reqwest`.
///
/// Only the connect phase is bounded; a slow transfer is left to finish.
#[derive(Debug, Clone)]
pub struct HttpAcquirer {
    client: Client,
}

impl HttpAcquirer {
    pub fn new() -> Result<Self, LoadError> {
        let client = Client::builder()
            .connect_timeout(SCRIPT_HTTP_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Aborted(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceAcquirer for HttpAcquirer {
    async fn acquire(&self, source: &ScriptSource) -> Result<LoadedScript, LoadError> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| map_http_error(&source.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::acquisition(
                &source.url,
                format!("Unexpected status {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_http_error(&source.url, e))?;
        if body.trim().is_empty() {
            return Err(LoadError::acquisition(&source.url, "Empty script body"));
        }

        Ok(LoadedScript {
            source: source.clone(),
            body,
        })
    }
}
