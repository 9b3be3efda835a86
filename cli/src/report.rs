//! JSON report printed by `reconcile` and `fetch`.

use std::collections::BTreeMap;

use serde::Serialize;

use chainnonce_core::{NonceBatch, NonceParams, RpcId};

#[derive(Debug, Serialize)]
pub struct NonceLine {
    pub id: RpcId,
    pub address: String,
    pub block: String,
    pub nonce: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorLine {
    pub id: RpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub error: String,
    /// The node reported the failure, as opposed to a bad or missing result.
    pub node_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub nonces: Vec<NonceLine>,
    pub errors: Vec<ErrorLine>,
    pub missing: Vec<RpcId>,
}

impl Report {
    pub fn new(batch: NonceBatch, id_to_params: &BTreeMap<RpcId, NonceParams>) -> Self {
        let missing = batch.missing_ids(id_to_params);
        let nonces = batch
            .successes
            .into_iter()
            .map(|rec| NonceLine {
                id: rec.id,
                address: rec.params.address,
                block: rec.params.block.to_string(),
                nonce: rec.value,
            })
            .collect();
        let errors = batch
            .errors
            .into_iter()
            .map(|err| ErrorLine {
                id: err.id,
                address: err.params.map(|p| p.address),
                node_error: err.error.is_node_error(),
                code: err.error.rpc_code(),
                error: err.error.to_string(),
            })
            .collect();
        Self {
            nonces,
            errors,
            missing,
        }
    }
}
