//! Job management REST API: read, filtered list, create and binary upload.

use super::{ApiResponse, build_http_client};
use crate::error::TransportError;
use crate::event::Credential;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Single-predicate `$filter` expression: `field eq 'value'`. The API
/// accepts no conjunctions, so anything more selective happens client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn expression(&self) -> String {
        format!("{} eq '{}'", self.field, self.value.replace('\'', "''"))
    }

    /// Whether a JSON record satisfies the predicate.
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        record.get(&self.field).and_then(serde_json::Value::as_str) == Some(self.value.as_str())
    }
}

/// Outcome of an atomic create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicCreate {
    /// The backend created the record; the response is a normal create reply.
    Created(ApiResponse),
    /// A record matching the uniqueness fields already exists.
    Exists,
    /// The backend offers no atomic primitive; the caller must scan.
    Unsupported,
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn read_one(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
    ) -> Result<ApiResponse, TransportError>;

    async fn list(
        &self,
        credential: &Credential,
        record_type: &str,
        filter: &Filter,
    ) -> Result<ApiResponse, TransportError>;

    /// Create a record. The new id arrives in [`ApiResponse::record_id`],
    /// never in the body.
    async fn create(
        &self,
        credential: &Credential,
        record_type: &str,
        fields: &[(&str, &str)],
    ) -> Result<ApiResponse, TransportError>;

    async fn upload_binary(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, TransportError>;

    /// Create unless a record agreeing on every `unique_on` field exists,
    /// as one atomic operation.
    async fn create_if_absent(
        &self,
        _credential: &Credential,
        _record_type: &str,
        _fields: &[(&str, &str)],
        _unique_on: &[&str],
    ) -> Result<AtomicCreate, TransportError> {
        Ok(AtomicCreate::Unsupported)
    }
}

/// `reqwest`-backed [`ResourceApi`]. Authenticates every call with the
/// invocation's bearer credential.
pub struct HttpResourceApi {
    base_url: String,
    date_format: String,
    client: Client,
}

impl HttpResourceApi {
    pub fn new(base_url: &str, date_format: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            date_format: date_format.to_string(),
            client: build_http_client(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TransportError(format!("invalid resource API base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TransportError("resource API base url cannot hold a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_url(&self, record_type: &str) -> Result<Url, TransportError> {
        self.url(&[format!("{record_type}.json").as_str()])
    }

    fn record_url(&self, record_type: &str, id: &str, ext: &str) -> Result<Url, TransportError> {
        self.url(&[record_type, format!("{id}.{ext}").as_str()])
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn read_one(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.record_url(record_type, id, "json")?;
        tracing::debug!(record_type, id, "resource read");
        let response = self
            .client
            .get(url)
            .bearer_auth(credential.expose())
            .send()
            .await?;
        ApiResponse::from_reqwest(response).await
    }

    async fn list(
        &self,
        credential: &Credential,
        record_type: &str,
        filter: &Filter,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.collection_url(record_type)?;
        let expression = filter.expression();
        tracing::debug!(record_type, filter = %expression, "resource list");
        let response = self
            .client
            .get(url)
            .query(&[("$filter", expression.as_str())])
            .header("sm-date-format", self.date_format.as_str())
            .bearer_auth(credential.expose())
            .send()
            .await?;
        ApiResponse::from_reqwest(response).await
    }

    async fn create(
        &self,
        credential: &Credential,
        record_type: &str,
        fields: &[(&str, &str)],
    ) -> Result<ApiResponse, TransportError> {
        let url = self.collection_url(record_type)?;
        tracing::debug!(record_type, "resource create");
        let response = self
            .client
            .post(url)
            .form(fields)
            .bearer_auth(credential.expose())
            .send()
            .await?;
        ApiResponse::from_reqwest(response).await
    }

    async fn upload_binary(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.record_url(record_type, id, "file")?;
        tracing::debug!(record_type, id, size = bytes.len(), "resource upload");
        let response = self
            .client
            .post(url)
            .body(bytes)
            .bearer_auth(credential.expose())
            .send()
            .await?;
        ApiResponse::from_reqwest(response).await
    }
}
