//! Batched inference service
//!
//! The facade callers use to classify texts. Every call becomes one pending
//! request in the batch queue; the caller waits on that request's result
//! channel until the scheduler completes it, the request times out or the
//! service stops.

use crate::core::backend::{BackendError, Classification, InferenceBackend};
use crate::core::batch::{
    BatchError, BatchOutcome, BatchPolicy, BatchQueue, BatchScheduler, PendingRequest, RequestId,
    StatsSnapshot,
};
use std::sync::Arc;
use tracing::debug;

/// Entry point for batched classification
///
/// Constructed stopped; [`start`](Self::start) must be called from within a
/// tokio runtime before any prediction is accepted.
pub struct InferenceService {
    scheduler: BatchScheduler,
}

impl InferenceService {
    pub fn new(backend: Arc<dyn InferenceBackend>, policy: BatchPolicy) -> Self {
        let queue = Arc::new(BatchQueue::new());
        Self {
            scheduler: BatchScheduler::new(backend, queue, policy),
        }
    }

    /// Start the batch scheduler. Idempotent.
    pub fn start(&self) -> bool {
        self.scheduler.start()
    }

    /// Stop the batch scheduler. Every queued or in-flight request has been
    /// resolved when this returns.
    pub async fn stop(&self) -> bool {
        self.scheduler.stop().await
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn policy(&self) -> &BatchPolicy {
        self.scheduler.policy()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.scheduler.snapshot()
    }

    /// Classify a single text
    pub async fn predict(&self, text: impl Into<String>) -> Result<Classification, BatchError> {
        let mut results = self.submit(vec![text.into()]).await?;
        results.pop().ok_or_else(|| {
            BatchError::backend(BackendError::InvalidResponse(
                "no result for single input".into(),
            ))
        })
    }

    /// Classify several texts as one request. The results arrive together
    /// and in input order.
    pub async fn predict_batch(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Classification>, BatchError> {
        if texts.is_empty() {
            return if self.is_running() {
                Ok(Vec::new())
            } else {
                Err(BatchError::ServiceNotRunning)
            };
        }
        self.submit(texts).await
    }

    async fn submit(&self, inputs: Vec<String>) -> BatchOutcome {
        let policy = *self.scheduler.policy();
        let units = inputs.len();
        if units > policy.max_batch_size {
            return Err(BatchError::BatchTooLarge {
                units,
                max: policy.max_batch_size,
            });
        }

        let (request, mut result_rx) = PendingRequest::new(inputs);
        let id = request.id();
        let deadline = request.submitted() + policy.request_timeout;

        let queue = self.scheduler.queue();
        let depth = queue.enqueue(request)?;
        debug!(request_id = %id, units, depth, "Request queued");

        // First request arms the window timer, a full queue flushes early
        if depth == units || depth >= policy.max_batch_size {
            self.scheduler.wake();
        }

        let mut guard = WithdrawOnDrop {
            queue,
            id,
            armed: true,
        };

        let received = match tokio::time::timeout_at(deadline, &mut result_rx).await {
            Ok(received) => received,
            Err(_) if queue.withdraw(id) => {
                self.scheduler.stats().record_timeouts(1);
                guard.armed = false;
                return Err(BatchError::RequestTimeout {
                    id,
                    waited: policy.request_timeout,
                });
            }
            // Already claimed by a batch: the scheduler owes this request an outcome
            Err(_) => {
                debug!(request_id = %id, "Deadline passed while in flight");
                result_rx.await
            }
        };

        // Sender dropped without an outcome: the loop was torn down
        let outcome = received.unwrap_or(Err(BatchError::ShutdownCancelled));
        guard.armed = false;
        outcome
    }
}

/// Removes the request from the queue if the caller's future is dropped
/// before an outcome arrived
struct WithdrawOnDrop<'a> {
    queue: &'a BatchQueue,
    id: RequestId,
    armed: bool,
}

impl Drop for WithdrawOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed && self.queue.withdraw(self.id) {
            debug!(request_id = %self.id, "Withdrew request of cancelled caller");
        }
    }
}
