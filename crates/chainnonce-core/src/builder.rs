//! Request builder: id → params map into a batch of wire requests.

use std::collections::BTreeMap;

use crate::method::{GetTransactionCount, RpcMethod};
use crate::params::NonceParams;
use crate::request::{JsonRpcRequest, RpcId};

/// Build one request per map entry, in ascending id order.
///
/// Each request carries its map key as `id` unchanged. Params are not
/// validated here.
pub fn build_requests<M: RpcMethod>(
    id_to_params: &BTreeMap<RpcId, M::Params>,
) -> Vec<JsonRpcRequest> {
    id_to_params
        .iter()
        .map(|(id, params)| M::to_request(id.clone(), params))
        .collect()
}

/// [`build_requests`] for `eth_getTransactionCount`.
pub fn build_nonce_requests(id_to_params: &BTreeMap<RpcId, NonceParams>) -> Vec<JsonRpcRequest> {
    build_requests::<GetTransactionCount>(id_to_params)
}

/// Key a plain list of queries by ids `1..=n`, in list order.
pub fn number_queries<P>(queries: impl IntoIterator<Item = P>) -> BTreeMap<RpcId, P> {
    queries
        .into_iter()
        .zip(1u64..)
        .map(|(params, id)| (RpcId::Number(id), params))
        .collect()
}
