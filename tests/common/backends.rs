//! Fixture backends
//!
//! Real `InferenceBackend` implementations whose calls can be inspected
//! or held back by the test.

use async_trait::async_trait;
use parking_lot::Mutex;
use sentiment_gateway::{BackendError, Classification, InferenceBackend};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// One observed backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub inputs: Vec<String>,
    pub at: Instant,
}

/// Labels each text with itself and records every call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().iter().map(|c| c.inputs.len()).collect()
    }
}

#[async_trait]
impl InferenceBackend for RecordingBackend {
    async fn classify(&self, texts: Vec<String>) -> Result<Vec<Classification>, BackendError> {
        self.calls.lock().push(RecordedCall {
            inputs: texts.clone(),
            at: Instant::now(),
        });
        Ok(texts
            .into_iter()
            .map(|t| Classification::new(t, 1.0))
            .collect())
    }
}

/// Fails the first `failures` calls, then echoes like [`RecordingBackend`]
#[derive(Debug)]
pub struct FlakyBackend {
    remaining_failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining_failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for FlakyBackend {
    async fn classify(&self, texts: Vec<String>) -> Result<Vec<Classification>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Status {
                status: 503,
                body: "model loading".into(),
            });
        }
        Ok(texts
            .into_iter()
            .map(|t| Classification::new(t, 1.0))
            .collect())
    }
}

/// Blocks every call until the test hands out a permit
#[derive(Debug)]
pub struct GatedBackend {
    gate: Semaphore,
    entered: AtomicUsize,
}

impl GatedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            entered: AtomicUsize::new(0),
        })
    }

    /// Let `calls` pending or future calls complete
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    /// Number of calls that reached the backend
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for GatedBackend {
    async fn classify(&self, texts: Vec<String>) -> Result<Vec<Classification>, BackendError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        permit.forget();
        Ok(texts
            .into_iter()
            .map(|t| Classification::new(t, 1.0))
            .collect())
    }
}
