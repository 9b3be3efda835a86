//! Response sanitization against the requested id set.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::request::{JsonRpcResponse, RpcId};

/// Keep only responses whose id was requested, first occurrence wins.
///
/// Order of the surviving responses follows the input list.
pub fn sanitize<P>(
    responses: Vec<JsonRpcResponse>,
    id_to_params: &BTreeMap<RpcId, P>,
) -> Vec<JsonRpcResponse> {
    let mut seen: HashSet<RpcId> = HashSet::with_capacity(responses.len());
    let mut kept = Vec::with_capacity(responses.len().min(id_to_params.len()));

    for resp in responses {
        if !id_to_params.contains_key(&resp.id) {
            debug!(id = %resp.id, "dropping response for unrequested id");
            continue;
        }
        if !seen.insert(resp.id.clone()) {
            warn!(id = %resp.id, "dropping duplicate response");
            continue;
        }
        kept.push(resp);
    }
    kept
}

/// Requested ids with no response in `responses`, in ascending order.
pub fn missing_ids<P>(
    responses: &[JsonRpcResponse],
    id_to_params: &BTreeMap<RpcId, P>,
) -> Vec<RpcId> {
    let answered: HashSet<&RpcId> = responses.iter().map(|r| &r.id).collect();
    id_to_params
        .keys()
        .filter(|id| !answered.contains(id))
        .cloned()
        .collect()
}
