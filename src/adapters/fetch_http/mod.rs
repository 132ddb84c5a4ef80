//! HTTP fetch adapter
//!
//! Streams a remote attachment into a staging file with one GET request.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::errors::*;
use crate::error::QuickEditResult;
use crate::ports::*;

/// reqwest-based fetch adapter
pub struct HttpFetchAdapter {
    client: reqwest::Client,
}

impl HttpFetchAdapter {
    /// Create new fetch adapter. `timeout` bounds the whole download when set.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> QuickEditResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl FetchPort for HttpFetchAdapter {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, ConversionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ConversionError::fetch_failed(url, e.to_string()))?;

        let mut file = File::create(destination).await.map_err(|e| {
            ConversionError::fetch_failed(url, format!("failed to open staging file: {}", e))
        })?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ConversionError::fetch_failed(url, e.to_string()))?;
            file.write_all(&chunk).await.map_err(|e| {
                ConversionError::fetch_failed(url, format!("failed to write staging file: {}", e))
            })?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ConversionError::fetch_failed(url, e.to_string()))?;

        debug!("Fetched {} bytes into {}", written, destination.display());
        Ok(written)
    }
}
