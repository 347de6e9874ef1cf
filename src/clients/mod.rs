//! Remote collaborators: the resource (job management) API, the weather
//! forecast API and the binary content source. Each is a trait so handlers
//! and pipelines can run against in-memory doubles.

pub mod content;
pub mod forecast;
pub mod resource;

#[cfg(test)]
pub(crate) mod fakes;

pub use content::{ContentSource, HttpContentSource};
pub use forecast::{ForecastApi, OpenWeatherMapClient};
pub use resource::{AtomicCreate, Filter, HttpResourceApi, ResourceApi};

use crate::error::TransportError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;

/// Header carrying the id of a freshly created record.
pub const RECORD_ID_HEADER: &str = "x-record-uuid";

/// Upper bound on the diagnostic body carried into error reports.
const MAX_DIAGNOSTIC_CHARS: usize = 8_192;

/// Per-call bound for every remote request. Kept below the gateway's
/// invocation timeout so a stalled remote fails as a tagged stage error.
pub const REMOTE_CALL_TIMEOUT_SECS: u64 = 20;

pub fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REMOTE_CALL_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Status, body and out-of-band record id of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub record_id: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            record_id: None,
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body text capped for inclusion in error reports.
    pub fn diagnostic(&self) -> String {
        let text = self.text();
        if text.chars().count() <= MAX_DIAGNOSTIC_CHARS {
            return text.into_owned();
        }
        let mut end = MAX_DIAGNOSTIC_CHARS;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self, TransportError> {
        let status = response.status().as_u16();
        let record_id = response
            .headers()
            .get(RECORD_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToOwned::to_owned);
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            body,
            record_id,
        })
    }
}
