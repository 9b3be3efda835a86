//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// JSON-RPC request ID — number, string, or null.
///
/// Ids are opaque to this crate: they are only compared, hashed and ordered
/// so a batch can be correlated back to its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    #[default]
    Null,
}

impl From<u64> for RpcId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RpcId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: impl Into<RpcId>, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// The `error` member of a response as it arrived on the wire.
///
/// Nodes do not always send a `{code, message}` object: some send a bare
/// string, others drop `message`. Anything that is not a well-formed error
/// object is kept verbatim in `NonStandard` so the entry still counts as an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcErrorPayload {
    Standard(JsonRpcError),
    NonStandard(Value),
}

impl From<JsonRpcError> for RpcErrorPayload {
    fn from(err: JsonRpcError) -> Self {
        Self::Standard(err)
    }
}

impl std::fmt::Display for RpcErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard(err) => write!(f, "{err}"),
            Self::NonStandard(raw) => write!(f, "non-standard error payload {raw}"),
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Both `result` and `error` are optional so that structurally invalid
/// responses (neither or both present) still deserialize and can be
/// classified per entry instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorPayload>,
}

fn default_version() -> String {
    "2.0".into()
}

impl JsonRpcResponse {
    /// Successful response carrying `result`.
    pub fn success(id: impl Into<RpcId>, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Failed response carrying a node error object.
    pub fn failure(id: impl Into<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// Parse one entry of a batch response array.
    ///
    /// An object whose members do not fit the response shape (a non-string
    /// `jsonrpc`, say) is still returned as an error response for its `id`,
    /// carrying the whole entry as a non-standard payload. Only entries with
    /// no usable id come back as `Err`, since nothing can match them to a
    /// request.
    pub fn from_entry(entry: Value) -> Result<Self, Value> {
        if let Ok(resp) = Self::deserialize(&entry) {
            return Ok(resp);
        }
        let id = match entry.as_object().map(|obj| obj.get("id")) {
            Some(None) => Some(RpcId::Null),
            Some(Some(raw)) => RpcId::deserialize(raw).ok(),
            None => None,
        };
        match id {
            Some(id) => {
                debug!(%id, "batch entry does not fit the response shape, keeping it as an error");
                Ok(Self {
                    jsonrpc: default_version(),
                    id,
                    result: None,
                    error: Some(RpcErrorPayload::NonStandard(entry)),
                })
            }
            None => Err(entry),
        }
    }

    /// Returns `true` if this is a successful response (has result, no error).
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }
}
