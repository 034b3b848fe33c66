// HTTP transport layer implementation
// This file implements the node HTTP API client: one JSON command per
// POST, with timeouts applied uniformly at this layer
//
// Numan Thabit 2025 Nov

use crate::errors::{ClientError, ClientResult};
use crate::metrics::{NODE_REQ_ERRORS, NODE_REQ_LATENCY};
use crate::router::routes::Operation;
use crate::transport::Endpoint;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const API_VERSION_HEADER: &str = "x-iota-api-version";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    http: Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static("1"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn send_command(&self, operation: Operation, params: Value) -> ClientResult<Value> {
        if operation.is_composite() {
            return Err(ClientError::Validation(format!(
                "{operation} is composite and has no node command"
            )));
        }
        let mut payload = match params {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(ClientError::Validation(format!(
                    "{operation} params must be an object, got {other}"
                )))
            }
        };
        payload.insert("command".into(), Value::String(operation.command().into()));

        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Transport(format!("{} timed out: {e}", operation.command()))
                } else {
                    ClientError::Transport(format!("{} send: {e}", operation.command()))
                }
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(format!("{} timed out reading body: {e}", operation.command()))
            } else {
                ClientError::Transport(format!("{} read body: {e}", operation.command()))
            }
        })?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(format!("http {status}: json parse: {e}")))?;

        if !status.is_success() {
            let detail = body
                .get("error")
                .or_else(|| body.get("exception"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            return Err(ClientError::Protocol(format!(
                "{} rejected with http {status}: {detail}",
                operation.command()
            )));
        }
        if !body.is_object() {
            return Err(ClientError::Protocol(format!(
                "{} returned non-object body: {body}",
                operation.command()
            )));
        }
        Ok(body)
    }
}

impl Endpoint for HttpEndpoint {
    fn address(&self) -> &str {
        &self.url
    }

    fn execute(&self, operation: Operation, params: Value) -> BoxFuture<'_, ClientResult<Value>> {
        async move {
            let command = operation.command();
            let started = Instant::now();
            let result = self.send_command(operation, params).await;
            NODE_REQ_LATENCY
                .with_label_values(&[self.url.as_str(), command])
                .observe(started.elapsed().as_secs_f64());
            match &result {
                Ok(_) => debug!(
                    endpoint = %self.url,
                    command = command,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "node command completed"
                ),
                Err(err) => {
                    NODE_REQ_ERRORS.with_label_values(&[self.url.as_str(), command]).inc();
                    warn!(endpoint = %self.url, command = command, error = %err, "node command failed");
                }
            }
            result
        }
        .boxed()
    }
}
