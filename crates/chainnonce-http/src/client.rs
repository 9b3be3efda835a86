//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! Batches go out as a single JSON array in one HTTP call. The client
//! deliberately has no retry, failover or rate limiting: a failed round
//! trip is returned to the caller as a [`TransportError`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use chainnonce_core::error::TransportError;
use chainnonce_core::request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use chainnonce_core::transport::RpcTransport;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, body: &T) -> Result<Value, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<Value>().await.map_err(|e| self.map_reqwest(e))
    }

    fn map_reqwest(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: timeout_ms(self.request_timeout),
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

/// Whole milliseconds of `timeout`, saturating at `u64::MAX`.
fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Split a batch response body into per-entry responses.
///
/// A single error object in place of the array means the node refused the
/// whole batch. Every array entry that carries an id is kept, even when its
/// `error` is not a `{code, message}` object, so the reconciler files it as
/// an error. Entries with no usable id are dropped and surface as missing
/// ids.
pub fn parse_batch_body(body: Value) -> Result<Vec<JsonRpcResponse>, TransportError> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => {
            return match obj.remove("error") {
                Some(err) => Err(TransportError::Rpc(serde_json::from_value::<JsonRpcError>(
                    err,
                )?)),
                None => Err(TransportError::Other(
                    "expected a batch response array, got a single object".into(),
                )),
            };
        }
        other => {
            return Err(TransportError::Other(format!(
                "expected a batch response array, got {other}"
            )))
        }
    };

    let total = entries.len();
    let parsed: Vec<JsonRpcResponse> = entries
        .into_iter()
        .filter_map(|entry| match JsonRpcResponse::from_entry(entry) {
            Ok(resp) => Some(resp),
            Err(entry) => {
                tracing::warn!(%entry, "dropping batch entry without a usable id");
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::warn!(total, parsed = parsed.len(), "batch response had malformed entries");
    }
    Ok(parsed)
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let body = self.post(&req).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// True HTTP batch: send all requests as a JSON array in one HTTP call.
    async fn send_batch(
        &self,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        if reqs.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(requests = reqs.len(), url = %self.url, "posting batch");
        let body = self.post(&reqs).await?;
        parse_batch_body(body)
    }

    fn url(&self) -> &str {
        &self.url
    }
}
