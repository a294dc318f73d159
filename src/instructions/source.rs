//! Remote document retrieval
//!
//! The cache talks to the document host through [`DocumentSource`] so the
//! network call can be swapped out (and counted) in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::errors::{AppResult, InstructionError, InstructionResult};

/// Fetches the plain-text body of a URL
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> InstructionResult<String>;
}

/// reqwest-backed document source
pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    /// Create a source whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch_text(&self, url: &str) -> InstructionResult<String> {
        debug!("Fetching instruction document from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InstructionError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstructionError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| InstructionError::fetch(url, format!("Failed to read response: {e}")))?;

        debug!("Fetched {} bytes of instruction text", body.len());
        Ok(body)
    }
}
