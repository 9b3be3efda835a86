//! Single-call codec: how one method encodes its params and decodes its result.
//!
//! A batch is only ever a list of independent calls, so everything the
//! builder and reconciler need to know about a method lives behind
//! [`RpcMethod`].

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::DecodeError;
use crate::params::{parse_quantity, NonceParams};
use crate::request::{JsonRpcRequest, JsonRpcResponse, RpcErrorPayload, RpcId, RpcParam};

/// A JSON-RPC method that can be batched.
pub trait RpcMethod {
    /// Caller-side parameters for one call.
    type Params: Clone;
    /// Decoded value of a successful call.
    type Output;

    /// Wire method name, e.g. `eth_getTransactionCount`.
    const METHOD: &'static str;

    /// Positional parameter list for `params`.
    fn encode_params(params: &Self::Params) -> Vec<RpcParam>;

    /// Decode the `result` field of a successful response.
    fn decode_result(result: Value) -> Result<Self::Output, DecodeError>;

    /// Build the wire request for one call.
    fn to_request(id: RpcId, params: &Self::Params) -> JsonRpcRequest {
        JsonRpcRequest::new(id, Self::METHOD, Self::encode_params(params))
    }
}

/// `eth_getTransactionCount(address, block)` → account nonce.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTransactionCount;

impl RpcMethod for GetTransactionCount {
    type Params = NonceParams;
    type Output = u64;

    const METHOD: &'static str = "eth_getTransactionCount";

    fn encode_params(params: &NonceParams) -> Vec<RpcParam> {
        vec![json!(params.address), json!(params.block.to_string())]
    }

    fn decode_result(result: Value) -> Result<u64, DecodeError> {
        let invalid = |reason: String| DecodeError::InvalidResult {
            value: result.to_string(),
            reason,
        };
        match &result {
            Value::String(s) => parse_quantity(s).map_err(invalid),
            _ => Err(invalid("expected a quantity string".into())),
        }
    }
}

/// A successfully decoded call together with the params that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord<P, T> {
    pub id: RpcId,
    pub params: P,
    pub value: T,
}

/// A failed call. `params` is `None` only when the id was never requested.
#[derive(Debug, Clone, PartialEq)]
pub struct CallError<P> {
    pub id: RpcId,
    pub params: Option<P>,
    pub error: DecodeError,
}

/// Decoded nonce with its query.
pub type NonceRecord = CallRecord<NonceParams, u64>;

/// Failed nonce query.
pub type NonceError = CallError<NonceParams>;

/// Outcome of decoding one response.
pub type CallOutcome<M> = Result<
    CallRecord<<M as RpcMethod>::Params, <M as RpcMethod>::Output>,
    CallError<<M as RpcMethod>::Params>,
>;

/// Decode one response, attaching the original params looked up by id.
///
/// An `error` object wins over a `result` when both are present.
pub fn decode_response<M: RpcMethod>(
    resp: JsonRpcResponse,
    id_to_params: &BTreeMap<RpcId, M::Params>,
) -> CallOutcome<M> {
    let Some(params) = id_to_params.get(&resp.id) else {
        return Err(CallError {
            error: DecodeError::UnknownId(resp.id.to_string()),
            id: resp.id,
            params: None,
        });
    };

    let decoded = match (resp.error, resp.result) {
        (Some(RpcErrorPayload::Standard(err)), _) => Err(DecodeError::Rpc(err)),
        (Some(RpcErrorPayload::NonStandard(raw)), _) => Err(DecodeError::NonStandardRpc(raw)),
        (None, None) => Err(DecodeError::MissingResult),
        (None, Some(result)) => M::decode_result(result),
    };

    match decoded {
        Ok(value) => Ok(CallRecord {
            id: resp.id,
            params: params.clone(),
            value,
        }),
        Err(error) => Err(CallError {
            id: resp.id,
            params: Some(params.clone()),
            error,
        }),
    }
}
