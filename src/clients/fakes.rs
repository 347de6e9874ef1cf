//! In-memory collaborators for unit tests: call-recording, with scriptable
//! transport and status failures per operation.

use super::{ApiResponse, AtomicCreate, ContentSource, Filter, ForecastApi, ResourceApi};
use crate::error::TransportError;
use crate::event::Credential;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Read,
    List,
    Create,
    Upload,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Transport,
    Status(u16),
}

impl Failure {
    fn into_result(self) -> Result<ApiResponse, TransportError> {
        match self {
            Self::Transport => Err(TransportError("connection refused".into())),
            Self::Status(status) => Ok(ApiResponse::new(status, format!("forced {status}"))),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Record store keyed by record type, mimicking the resource API.
#[derive(Default)]
pub(crate) struct MemoryResourceApi {
    records: Mutex<HashMap<String, Vec<Value>>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    calls: Mutex<Vec<(Op, String)>>,
    failures: Mutex<HashMap<Op, Failure>>,
    tokens: Mutex<Vec<String>>,
    omit_record_id: AtomicBool,
    atomic: bool,
    next_id: AtomicUsize,
}

impl MemoryResourceApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_atomic_create() -> Self {
        Self {
            atomic: true,
            ..Self::default()
        }
    }

    pub(crate) fn insert(&self, record_type: &str, record: Value) {
        lock(&self.records)
            .entry(record_type.to_string())
            .or_default()
            .push(record);
    }

    pub(crate) fn records(&self, record_type: &str) -> Vec<Value> {
        lock(&self.records)
            .get(record_type)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        lock(&self.uploads).clone()
    }

    pub(crate) fn count(&self, op: Op) -> usize {
        lock(&self.calls).iter().filter(|(o, _)| *o == op).count()
    }

    pub(crate) fn calls(&self) -> Vec<(Op, String)> {
        lock(&self.calls).clone()
    }

    /// Tokens presented by callers, in call order.
    pub(crate) fn tokens(&self) -> Vec<String> {
        lock(&self.tokens).clone()
    }

    pub(crate) fn fail(&self, op: Op, failure: Failure) {
        lock(&self.failures).insert(op, failure);
    }

    pub(crate) fn heal(&self, op: Op) {
        lock(&self.failures).remove(&op);
    }

    pub(crate) fn omit_record_id(&self) {
        self.omit_record_id.store(true, Ordering::SeqCst);
    }

    fn record(&self, op: Op, what: String, credential: &Credential) -> Option<Failure> {
        lock(&self.calls).push((op, what));
        lock(&self.tokens).push(credential.expose().to_string());
        lock(&self.failures).get(&op).copied()
    }

    /// A fresh record with an assigned id, and the create reply for it.
    fn new_record(&self, fields: &[(&str, &str)]) -> (Value, ApiResponse) {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut record = Map::new();
        record.insert("uuid".into(), Value::String(id.clone()));
        for (key, value) in fields {
            record.insert((*key).to_string(), Value::String((*value).to_string()));
        }

        let response = ApiResponse::ok(r#"{"errorCode":0,"message":"OK"}"#);
        let response = if self.omit_record_id.load(Ordering::SeqCst) {
            response
        } else {
            response.with_record_id(id)
        };
        (Value::Object(record), response)
    }

    fn insert_fields(&self, record_type: &str, fields: &[(&str, &str)]) -> ApiResponse {
        let (record, response) = self.new_record(fields);
        self.insert(record_type, record);
        response
    }

    /// Check and insert under one lock of the record store.
    fn insert_unique(
        &self,
        record_type: &str,
        fields: &[(&str, &str)],
        unique_on: &[&str],
    ) -> AtomicCreate {
        let mut records = lock(&self.records);
        let bucket = records.entry(record_type.to_string()).or_default();
        let exists = bucket.iter().any(|record| {
            fields
                .iter()
                .filter(|(key, _)| unique_on.contains(key))
                .all(|(key, value)| record.get(*key).and_then(Value::as_str) == Some(*value))
        });
        if exists {
            return AtomicCreate::Exists;
        }
        let (record, response) = self.new_record(fields);
        bucket.push(record);
        AtomicCreate::Created(response)
    }
}

#[async_trait]
impl ResourceApi for MemoryResourceApi {
    async fn read_one(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
    ) -> Result<ApiResponse, TransportError> {
        if let Some(failure) = self.record(Op::Read, format!("{record_type}/{id}"), credential) {
            return failure.into_result();
        }
        let found = self
            .records(record_type)
            .into_iter()
            .find(|r| r.get("uuid").and_then(Value::as_str) == Some(id));
        Ok(match found {
            Some(record) => ApiResponse::ok(record.to_string()),
            None => ApiResponse::new(404, r#"{"errorCode":404,"message":"Record not found"}"#),
        })
    }

    async fn list(
        &self,
        credential: &Credential,
        record_type: &str,
        filter: &Filter,
    ) -> Result<ApiResponse, TransportError> {
        let what = format!("{record_type}?{}", filter.expression());
        if let Some(failure) = self.record(Op::List, what, credential) {
            return failure.into_result();
        }
        let matching: Vec<Value> = self
            .records(record_type)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        Ok(ApiResponse::ok(Value::Array(matching).to_string()))
    }

    async fn create(
        &self,
        credential: &Credential,
        record_type: &str,
        fields: &[(&str, &str)],
    ) -> Result<ApiResponse, TransportError> {
        if let Some(failure) = self.record(Op::Create, record_type.to_string(), credential) {
            return failure.into_result();
        }
        Ok(self.insert_fields(record_type, fields))
    }

    async fn upload_binary(
        &self,
        credential: &Credential,
        record_type: &str,
        id: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, TransportError> {
        if let Some(failure) = self.record(Op::Upload, format!("{record_type}/{id}"), credential)
        {
            return failure.into_result();
        }
        let exists = self
            .records(record_type)
            .iter()
            .any(|r| r.get("uuid").and_then(Value::as_str) == Some(id));
        if !exists {
            return Ok(ApiResponse::new(404, "no such record"));
        }
        lock(&self.uploads).push((id.to_string(), bytes));
        Ok(ApiResponse::ok(""))
    }

    async fn create_if_absent(
        &self,
        credential: &Credential,
        record_type: &str,
        fields: &[(&str, &str)],
        unique_on: &[&str],
    ) -> Result<AtomicCreate, TransportError> {
        if !self.atomic {
            return Ok(AtomicCreate::Unsupported);
        }
        if let Some(failure) = self.record(Op::Create, record_type.to_string(), credential) {
            return failure.into_result().map(AtomicCreate::Created);
        }
        Ok(self.insert_unique(record_type, fields, unique_on))
    }
}

/// Serves one fixed payload, optionally after a delay.
pub(crate) struct MemoryContentSource {
    payload: Vec<u8>,
    delay: Option<Duration>,
    failure: Mutex<Option<Failure>>,
    calls: AtomicUsize,
}

impl MemoryContentSource {
    pub(crate) fn new(payload: &[u8]) -> Self {
        Self {
            payload: payload.to_vec(),
            delay: None,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn delayed(payload: &[u8], delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(payload)
        }
    }

    pub(crate) fn fail(&self, failure: Failure) {
        *lock(&self.failure) = Some(failure);
    }

    pub(crate) fn heal(&self) {
        *lock(&self.failure) = None;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn fetch_binary(&self, _locator: &str) -> Result<ApiResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = *lock(&self.failure);
        if let Some(failure) = failure {
            return failure.into_result();
        }
        Ok(ApiResponse::ok(self.payload.clone()))
    }
}

/// Answers every forecast read with the same document.
pub(crate) struct StaticForecastApi {
    body: String,
    failure: Option<Failure>,
    calls: AtomicUsize,
}

impl StaticForecastApi {
    pub(crate) fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(failure: Failure) -> Self {
        Self {
            body: String::new(),
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastApi for StaticForecastApi {
    async fn read(&self, _lat: f64, _lng: f64) -> Result<ApiResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return failure.into_result();
        }
        Ok(ApiResponse::ok(self.body.clone()))
    }
}
