//! Error types.
//!
//! Two layers: [`TransportError`] fails a whole batch round trip and is
//! handled by the caller, while [`DecodeError`] describes why a single
//! response could not be turned into a value and never escapes a batch.

use serde_json::Value;
use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while moving a batch over the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node rejected the batch as a whole with a single error object.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response body could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and the batch may be resent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

/// Why a single batch entry ended up in the error bucket.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The node answered this entry with an `error` object.
    #[error("{0}")]
    Rpc(JsonRpcError),

    /// The node answered with an `error` that is not a `{code, message}`
    /// object. The raw payload is kept as received.
    #[error("non-standard error payload {0}")]
    NonStandardRpc(Value),

    /// The response carried neither `result` nor `error`.
    #[error("response has neither result nor error")]
    MissingResult,

    /// `result` was present but not the shape the method expects.
    #[error("invalid result {value}: {reason}")]
    InvalidResult { value: String, reason: String },

    /// The response id does not belong to this batch.
    #[error("response id {0} was not requested")]
    UnknownId(String),
}

impl DecodeError {
    /// Returns `true` if the node itself reported the failure.
    pub fn is_node_error(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::NonStandardRpc(_))
    }

    /// JSON-RPC error code, when the node sent a well-formed error object.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(err) => Some(err.code),
            _ => None,
        }
    }
}
