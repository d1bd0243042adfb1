//! Types shared by the batch queue and scheduler

use crate::core::backend::{BackendError, Classification};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

/// Outcome delivered to a caller through its result channel
pub type BatchOutcome = std::result::Result<Vec<Classification>, BatchError>;

/// Errors delivered to callers of the batching core
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    /// The backend call for the request's batch failed. Every request of
    /// that batch receives the same cause.
    #[error("inference backend failed: {0}")]
    BackendFailure(Arc<BackendError>),

    /// The request outlived the maximum request age
    #[error("request {id} timed out after {waited:?}")]
    RequestTimeout { id: RequestId, waited: Duration },

    /// Submitted while the service was stopped
    #[error("inference service is not running")]
    ServiceNotRunning,

    /// Queued or in flight when the service was stopped
    #[error("request cancelled by service shutdown")]
    ShutdownCancelled,

    /// The request alone exceeds the maximum batch size
    #[error("request has {units} inputs but the maximum batch size is {max}")]
    BatchTooLarge { units: usize, max: usize },
}

impl BatchError {
    pub(crate) fn backend(err: BackendError) -> Self {
        Self::BackendFailure(Arc::new(err))
    }
}

/// Opaque identifier used for tracing individual requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req_{}", self.0.simple())
    }
}

/// Size and time bounds applied when forming batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Maximum number of input units per backend call (default: 16)
    pub max_batch_size: usize,
    /// Longest time a partially filled batch is held open (default: 100ms)
    pub max_batch_wait: Duration,
    /// Age at which a request still waiting is failed (default: 30s)
    pub request_timeout: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_batch_size: 16,
            max_batch_wait: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BatchPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum batch size in input units
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// Set the coalescing window
    pub fn with_max_batch_wait(mut self, max_batch_wait: Duration) -> Self {
        self.max_batch_wait = max_batch_wait;
        self
    }

    /// Set the hard request age cap
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// How often queued requests are checked for expiry while a backend
    /// call is in flight
    pub(crate) fn sweep_interval(&self) -> Duration {
        self.max_batch_wait
            .min(self.request_timeout / 4)
            .max(Duration::from_millis(1))
    }
}

/// One caller's submission waiting for its batch
#[derive(Debug)]
pub struct PendingRequest {
    id: RequestId,
    inputs: Vec<String>,
    submitted_at: Instant,
    result_tx: oneshot::Sender<BatchOutcome>,
}

impl PendingRequest {
    /// Create a request submitted now, returning the receiving half of its
    /// result channel
    pub fn new(inputs: Vec<String>) -> (Self, oneshot::Receiver<BatchOutcome>) {
        Self::submitted_at(inputs, Instant::now())
    }

    /// Create a request with an explicit submission time
    pub fn submitted_at(
        inputs: Vec<String>,
        submitted_at: Instant,
    ) -> (Self, oneshot::Receiver<BatchOutcome>) {
        let (result_tx, result_rx) = oneshot::channel();
        let request = Self {
            id: RequestId::new(),
            inputs,
            submitted_at,
            result_tx,
        };
        (request, result_rx)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Number of input units this request contributes to a batch
    pub fn units(&self) -> usize {
        self.inputs.len()
    }

    pub fn submitted(&self) -> Instant {
        self.submitted_at
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.submitted_at)
    }

    /// Whether the caller stopped waiting for the outcome
    pub(crate) fn is_abandoned(&self) -> bool {
        self.result_tx.is_closed()
    }

    /// Deliver the terminal outcome. Returns `false` if the caller is gone.
    pub fn complete(self, outcome: BatchOutcome) -> bool {
        self.result_tx.send(outcome).is_ok()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, ResultSlot) {
        let slot = ResultSlot {
            id: self.id,
            units: self.inputs.len(),
            result_tx: self.result_tx,
        };
        (self.inputs, slot)
    }
}

/// Completion half of a request whose inputs were handed to the backend
#[derive(Debug)]
pub(crate) struct ResultSlot {
    pub(crate) id: RequestId,
    pub(crate) units: usize,
    result_tx: oneshot::Sender<BatchOutcome>,
}

impl ResultSlot {
    pub(crate) fn complete(self, outcome: BatchOutcome) -> bool {
        self.result_tx.send(outcome).is_ok()
    }
}
