//! chainnonce-core — batch nonce queries over JSON-RPC.
//!
//! # Overview
//!
//! A batch of `eth_getTransactionCount` queries goes out as one transport
//! unit and comes back as a mix of results, node errors and malformed or
//! missing entries. This crate builds the batch and classifies every answer
//! back to the params that produced it:
//!
//! - [`build_requests`] — id → params map into wire requests
//! - [`sanitize`] — drop responses for ids that were never requested
//! - [`reconcile`] — decode and split into successes and errors
//! - [`BatchCaller`] — build, send through an [`RpcTransport`], reconcile
//! - [`RpcMethod`] / [`GetTransactionCount`] — single-call codec
//!
//! ```
//! use std::collections::BTreeMap;
//! use chainnonce_core::{build_nonce_requests, reconcile_nonces, BlockRef, JsonRpcResponse, NonceParams, RpcId};
//!
//! let map = BTreeMap::from([(RpcId::Number(1), NonceParams::new("0xaa", BlockRef::Latest))]);
//! let requests = build_nonce_requests(&map);
//! assert_eq!(requests.len(), 1);
//!
//! let responses = vec![JsonRpcResponse::success(1u64, serde_json::json!("0x5"))];
//! let out = reconcile_nonces(responses, &map);
//! assert_eq!(out.successes[0].value, 5);
//! ```

pub mod batch;
pub mod builder;
pub mod config;
pub mod error;
pub mod method;
pub mod params;
pub mod reconcile;
pub mod request;
pub mod sanitize;
pub mod transport;

pub use batch::BatchCaller;
pub use builder::{build_nonce_requests, build_requests, number_queries};
pub use config::BatchConfig;
pub use error::{DecodeError, TransportError};
pub use method::{
    decode_response, CallError, CallRecord, GetTransactionCount, NonceError, NonceRecord,
    RpcMethod,
};
pub use params::{BlockRef, NonceParams};
pub use reconcile::{reconcile, reconcile_nonces, reconcile_par, reconcile_with, NonceBatch, Reconciled};
pub use request::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcErrorPayload, RpcId, RpcParam,
};
pub use sanitize::{missing_ids, sanitize};
pub use transport::RpcTransport;
