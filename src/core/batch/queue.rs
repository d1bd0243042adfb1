//! FIFO buffer of requests awaiting a batch

use super::types::{BatchError, BatchPolicy, PendingRequest, RequestId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Lock-protected queue of pending requests in arrival order
///
/// The lock is only held for slice operations on the buffer and for handing
/// terminal outcomes to result channels; it is never held across an await.
#[derive(Debug, Default)]
pub struct BatchQueue {
    inner: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    requests: VecDeque<PendingRequest>,
    units: usize,
    open: bool,
}

impl QueueState {
    fn evict_expired(&mut self, request_timeout: Duration, now: Instant) -> usize {
        if !self.requests.iter().any(|r| r.age(now) > request_timeout) {
            return 0;
        }

        let (expired, kept): (Vec<_>, Vec<_>) = self
            .requests
            .drain(..)
            .partition(|r| r.age(now) > request_timeout);
        self.requests = kept.into();

        for request in &expired {
            self.units -= request.units();
        }

        let count = expired.len();
        for request in expired {
            let id = request.id();
            let waited = request.age(now);
            warn!(request_id = %id, waited_ms = waited.as_millis() as u64, "Evicting expired request");
            request.complete(Err(BatchError::RequestTimeout { id, waited }));
        }
        count
    }

    fn prune_abandoned(&mut self) {
        let before = self.requests.len();
        let mut released = 0;
        self.requests.retain(|r| {
            let abandoned = r.is_abandoned();
            if abandoned {
                released += r.units();
            }
            !abandoned
        });
        self.units -= released;

        let pruned = before - self.requests.len();
        if pruned > 0 {
            debug!(pruned, "Dropped requests whose callers went away");
        }
    }
}

impl BatchQueue {
    /// Create a closed queue; call [`open`](Self::open) before enqueueing
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept new requests
    pub fn open(&self) {
        self.inner.lock().open = true;
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    /// Append a request at the tail.
    ///
    /// Returns the queued input-unit count including this request, or
    /// `ServiceNotRunning` if the queue is closed.
    pub fn enqueue(&self, request: PendingRequest) -> Result<usize, BatchError> {
        let mut state = self.inner.lock();
        if !state.open {
            return Err(BatchError::ServiceNotRunning);
        }
        state.units += request.units();
        state.requests.push_back(request);
        Ok(state.units)
    }

    /// Remove the next batch from the head of the queue.
    ///
    /// Expired requests are failed with `RequestTimeout` and requests whose
    /// callers went away are dropped first. An empty batch is returned while
    /// the coalescing window is still open, i.e. the queue holds fewer than
    /// `max_batch_size` units and its oldest request is younger than
    /// `max_batch_wait`. Otherwise requests are taken in order until the
    /// next one would push the batch past `max_batch_size`.
    pub fn drain_batch(&self, policy: &BatchPolicy, now: Instant) -> Vec<PendingRequest> {
        let mut state = self.inner.lock();
        state.evict_expired(policy.request_timeout, now);
        state.prune_abandoned();

        let Some(oldest) = state.requests.front() else {
            return Vec::new();
        };
        let window_closed = oldest.age(now) >= policy.max_batch_wait;
        if state.units < policy.max_batch_size && !window_closed {
            return Vec::new();
        }

        let mut batch = Vec::new();
        let mut units = 0;
        while let Some(next) = state.requests.front() {
            // An oversized head request still goes out alone
            if !batch.is_empty() && units + next.units() > policy.max_batch_size {
                break;
            }
            let Some(request) = state.requests.pop_front() else {
                break;
            };
            units += request.units();
            batch.push(request);
            if units >= policy.max_batch_size {
                break;
            }
        }
        state.units -= units;
        batch
    }

    /// Fail every request older than `request_timeout` with
    /// `RequestTimeout`. Returns the number of evicted requests.
    pub fn evict_expired(&self, request_timeout: Duration, now: Instant) -> usize {
        self.inner.lock().evict_expired(request_timeout, now)
    }

    /// Instant at which the window of the oldest queued request closes
    pub fn window_deadline(&self, max_batch_wait: Duration) -> Option<Instant> {
        self.inner
            .lock()
            .requests
            .front()
            .map(|oldest| oldest.submitted() + max_batch_wait)
    }

    /// Remove a request that is still queued. Returns `false` if it was
    /// already claimed into a batch or completed.
    pub fn withdraw(&self, id: RequestId) -> bool {
        let mut state = self.inner.lock();
        let Some(position) = state.requests.iter().position(|r| r.id() == id) else {
            return false;
        };
        match state.requests.remove(position) {
            Some(request) => {
                state.units -= request.units();
                true
            }
            None => false,
        }
    }

    /// Stop accepting requests and fail everything still queued with
    /// `ShutdownCancelled`. Returns the number of cancelled requests.
    pub fn close_and_cancel(&self) -> usize {
        let cancelled: Vec<PendingRequest> = {
            let mut state = self.inner.lock();
            state.open = false;
            state.units = 0;
            state.requests.drain(..).collect()
        };

        let count = cancelled.len();
        for request in cancelled {
            request.complete(Err(BatchError::ShutdownCancelled));
        }
        count
    }

    /// Number of queued requests
    pub fn len(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().requests.is_empty()
    }

    /// Number of queued input units
    pub fn units(&self) -> usize {
        self.inner.lock().units
    }
}
