//! `BatchCaller` — build, send and reconcile in one call.
//!
//! Large inputs are split into chunks of at most `max_batch_size` requests.
//! Chunks are sent one after another and their reconciled results are
//! concatenated in chunk order, so the caller sees a single batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::builder::{build_requests, number_queries};
use crate::config::BatchConfig;
use crate::error::TransportError;
use crate::method::{GetTransactionCount, RpcMethod};
use crate::params::NonceParams;
use crate::reconcile::{reconcile_with, NonceBatch, Reconciled};
use crate::request::RpcId;
use crate::sanitize::missing_ids;
use crate::transport::RpcTransport;

/// Drives batches of independent calls through an [`RpcTransport`].
pub struct BatchCaller {
    transport: Arc<dyn RpcTransport>,
    config: BatchConfig,
}

impl BatchCaller {
    pub fn new(transport: Arc<dyn RpcTransport>, config: BatchConfig) -> Self {
        Self { transport, config }
    }

    /// Create with default configuration.
    pub fn default_for(transport: Arc<dyn RpcTransport>) -> Self {
        Self::new(transport, BatchConfig::default())
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run one logical batch of `M` calls.
    ///
    /// Only a transport failure is returned as `Err`; every per-entry
    /// failure is an error record inside the `Ok` value.
    pub async fn call<M>(
        &self,
        id_to_params: &BTreeMap<RpcId, M::Params>,
    ) -> Result<Reconciled<M::Params, M::Output>, TransportError>
    where
        M: RpcMethod,
        M::Params: Send + Sync,
        M::Output: Send,
    {
        let mut outcome = Reconciled::default();
        if id_to_params.is_empty() {
            return Ok(outcome);
        }

        let chunk_size = self.config.chunk_size(id_to_params.len());
        let entries: Vec<_> = id_to_params.iter().collect();

        for (index, chunk) in entries.chunks(chunk_size).enumerate() {
            let chunk: BTreeMap<RpcId, M::Params> = chunk
                .iter()
                .map(|(id, params)| ((*id).clone(), (*params).clone()))
                .collect();

            let requests = build_requests::<M>(&chunk);
            debug!(
                method = M::METHOD,
                chunk = index,
                requests = requests.len(),
                url = %self.transport.url(),
                "sending batch"
            );

            let responses = self.transport.send_batch(requests).await?;

            let missing = missing_ids(&responses, &chunk);
            if !missing.is_empty() {
                warn!(
                    method = M::METHOD,
                    chunk = index,
                    missing = missing.len(),
                    "batch response is missing entries"
                );
            }

            outcome.merge(reconcile_with::<M>(responses, &chunk, &self.config));
        }

        info!(
            method = M::METHOD,
            requested = id_to_params.len(),
            ok = outcome.successes.len(),
            failed = outcome.errors.len(),
            "batch reconciled"
        );
        Ok(outcome)
    }

    /// Fetch nonces for `queries`, keyed by ids `1..=n` in list order.
    pub async fn transaction_counts(
        &self,
        queries: Vec<NonceParams>,
    ) -> Result<NonceBatch, TransportError> {
        let id_to_params = number_queries(queries);
        self.call::<GetTransactionCount>(&id_to_params).await
    }
}
