//! Request batching configuration

use super::*;
use crate::core::batch::BatchPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request batching configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Maximum number of input texts per model call
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Longest time a partially filled batch is held open, in milliseconds
    #[serde(default = "default_max_batch_wait_ms")]
    pub max_batch_wait_ms: u64,
    /// Age after which a waiting request fails with a timeout, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_batch_wait_ms: default_max_batch_wait_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BatchingConfig {
    /// Scheduler policy described by this configuration
    pub fn policy(&self) -> BatchPolicy {
        BatchPolicy::new()
            .with_max_batch_size(self.max_batch_size)
            .with_max_batch_wait(Duration::from_millis(self.max_batch_wait_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
    }
}
