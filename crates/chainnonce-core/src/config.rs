//! Batch tuning knobs.

use serde::{Deserialize, Serialize};

/// Configuration for [`BatchCaller`](crate::batch::BatchCaller) and
/// [`reconcile_with`](crate::reconcile::reconcile_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Max requests per transport call. `0` means no limit.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Response count at which decoding switches to the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_max_batch_size() -> usize {
    100
}

fn default_parallel_threshold() -> usize {
    1024
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl BatchConfig {
    pub fn max_batch_size(mut self, n: usize) -> Self {
        self.max_batch_size = n;
        self
    }

    pub fn parallel_threshold(mut self, n: usize) -> Self {
        self.parallel_threshold = n;
        self
    }

    /// Effective chunk size for `len` requests.
    pub(crate) fn chunk_size(&self, len: usize) -> usize {
        match self.max_batch_size {
            0 => len.max(1),
            n => n,
        }
    }
}
