//! Service and policy factories

use sentiment_gateway::{BatchPolicy, InferenceBackend, InferenceService};
use std::sync::Arc;
use std::time::Duration;

/// Policy with the given size, window and request timeout
pub fn policy(max_batch_size: usize, wait_ms: u64, timeout_ms: u64) -> BatchPolicy {
    BatchPolicy::new()
        .with_max_batch_size(max_batch_size)
        .with_max_batch_wait(Duration::from_millis(wait_ms))
        .with_request_timeout(Duration::from_millis(timeout_ms))
}

/// Started service shared between caller tasks
pub fn service_with(backend: Arc<dyn InferenceBackend>, policy: BatchPolicy) -> Arc<InferenceService> {
    let service = Arc::new(InferenceService::new(backend, policy));
    service.start();
    service
}
