//! Response reconciler: fold a batch's responses into successes and errors.
//!
//! Every response that survives [`sanitize`] lands in exactly one of the two
//! collections. A bad entry becomes an error record and never stops the
//! rest of the batch from being classified. Both collections keep the
//! relative order of the response list.

use std::collections::{BTreeMap, HashSet};

use rayon::iter::{Either, IntoParallelIterator, ParallelIterator};

use crate::config::BatchConfig;
use crate::method::{decode_response, CallError, CallRecord, GetTransactionCount, RpcMethod};
use crate::params::NonceParams;
use crate::request::{JsonRpcResponse, RpcId};
use crate::sanitize::sanitize;

/// Classified result of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<P, T> {
    pub successes: Vec<CallRecord<P, T>>,
    pub errors: Vec<CallError<P>>,
}

/// Reconciled `eth_getTransactionCount` batch.
pub type NonceBatch = Reconciled<NonceParams, u64>;

impl<P, T> Default for Reconciled<P, T> {
    fn default() -> Self {
        Self {
            successes: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<P, T> Reconciled<P, T> {
    /// Total number of classified responses.
    pub fn len(&self) -> usize {
        self.successes.len() + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }

    /// Requested ids that produced neither a success nor an error.
    pub fn missing_ids(&self, id_to_params: &BTreeMap<RpcId, P>) -> Vec<RpcId> {
        let classified: HashSet<&RpcId> = self
            .successes
            .iter()
            .map(|s| &s.id)
            .chain(self.errors.iter().map(|e| &e.id))
            .collect();
        id_to_params
            .keys()
            .filter(|id| !classified.contains(id))
            .cloned()
            .collect()
    }

    /// Append another batch's records after this one's.
    pub fn merge(&mut self, other: Self) {
        self.successes.extend(other.successes);
        self.errors.extend(other.errors);
    }

    fn push(mut self, outcome: Result<CallRecord<P, T>, CallError<P>>) -> Self {
        match outcome {
            Ok(record) => self.successes.push(record),
            Err(error) => self.errors.push(error),
        }
        self
    }
}

/// Sanitize, decode and classify `responses` on the current thread.
pub fn reconcile<M: RpcMethod>(
    responses: Vec<JsonRpcResponse>,
    id_to_params: &BTreeMap<RpcId, M::Params>,
) -> Reconciled<M::Params, M::Output> {
    sanitize(responses, id_to_params)
        .into_iter()
        .map(|resp| decode_response::<M>(resp, id_to_params))
        .fold(Reconciled::default(), Reconciled::push)
}

/// Same result as [`reconcile`], decoding on the rayon pool.
pub fn reconcile_par<M>(
    responses: Vec<JsonRpcResponse>,
    id_to_params: &BTreeMap<RpcId, M::Params>,
) -> Reconciled<M::Params, M::Output>
where
    M: RpcMethod,
    M::Params: Send + Sync,
    M::Output: Send,
{
    let (successes, errors) = sanitize(responses, id_to_params)
        .into_par_iter()
        .partition_map(|resp| match decode_response::<M>(resp, id_to_params) {
            Ok(record) => Either::Left(record),
            Err(error) => Either::Right(error),
        });
    Reconciled { successes, errors }
}

/// Pick [`reconcile`] or [`reconcile_par`] by batch size.
pub fn reconcile_with<M>(
    responses: Vec<JsonRpcResponse>,
    id_to_params: &BTreeMap<RpcId, M::Params>,
    config: &BatchConfig,
) -> Reconciled<M::Params, M::Output>
where
    M: RpcMethod,
    M::Params: Send + Sync,
    M::Output: Send,
{
    if responses.len() >= config.parallel_threshold {
        reconcile_par::<M>(responses, id_to_params)
    } else {
        reconcile::<M>(responses, id_to_params)
    }
}

/// [`reconcile`] for `eth_getTransactionCount`.
pub fn reconcile_nonces(
    responses: Vec<JsonRpcResponse>,
    id_to_params: &BTreeMap<RpcId, NonceParams>,
) -> NonceBatch {
    reconcile::<GetTransactionCount>(responses, id_to_params)
}
