//! Source of the binary payload attached to jobs.

use super::{ApiResponse, build_http_client};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_binary(&self, locator: &str) -> Result<ApiResponse, TransportError>;
}

/// Fetches content with a plain unauthenticated GET. The invocation
/// credential is for the resource API only and is never sent here.
pub struct HttpContentSource {
    client: Client,
}

impl Default for HttpContentSource {
    fn default() -> Self {
        Self {
            client: build_http_client(),
        }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_binary(&self, locator: &str) -> Result<ApiResponse, TransportError> {
        tracing::debug!(locator, "content fetch");
        let response = self.client.get(locator).send().await?;
        ApiResponse::from_reqwest(response).await
    }
}
