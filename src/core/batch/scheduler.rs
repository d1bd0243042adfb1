//! Background coalescing loop
//!
//! The loop sleeps until the coalescing window of the oldest queued request
//! closes, a wake signal arrives or shutdown is requested. It then drains one
//! batch, runs a single backend call for it and splits the flat result list
//! back into per-request slices. Only one backend call is in flight at a
//! time; queued requests keep being checked for expiry while it runs.

use super::queue::BatchQueue;
use super::stats::{SchedulerStats, StatsSnapshot};
use super::types::{BatchError, BatchPolicy, PendingRequest, ResultSlot};
use crate::core::backend::{BackendError, Classification, InferenceBackend};
use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Owner of the coalescing loop and its start/stop lifecycle
pub struct BatchScheduler {
    backend: Arc<dyn InferenceBackend>,
    queue: Arc<BatchQueue>,
    policy: BatchPolicy,
    wake: Arc<Notify>,
    stats: Arc<SchedulerStats>,
    running: Mutex<Option<LoopHandle>>,
}

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BatchScheduler {
    /// Create a stopped scheduler draining `queue`
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        queue: Arc<BatchQueue>,
        policy: BatchPolicy,
    ) -> Self {
        Self {
            backend,
            queue,
            policy,
            wake: Arc::new(Notify::new()),
            stats: Arc::new(SchedulerStats::default()),
            running: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    pub fn queue(&self) -> &Arc<BatchQueue> {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Open the queue and spawn the loop on the current tokio runtime.
    ///
    /// Returns `false` if the scheduler was already running.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.is_some() {
            debug!("Batch scheduler already running");
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        self.queue.open();

        let coalescer = Coalescer {
            backend: Arc::clone(&self.backend),
            queue: Arc::clone(&self.queue),
            policy: self.policy,
            wake: Arc::clone(&self.wake),
            stats: Arc::clone(&self.stats),
        };
        let task = tokio::spawn(coalescer.run(shutdown_rx));
        *running = Some(LoopHandle { shutdown, task });

        info!(
            max_batch_size = self.policy.max_batch_size,
            max_batch_wait_ms = self.policy.max_batch_wait.as_millis() as u64,
            request_timeout_ms = self.policy.request_timeout.as_millis() as u64,
            "Batch scheduler started"
        );
        true
    }

    /// Close the queue, cancel everything queued or in flight with
    /// `ShutdownCancelled` and wait for the loop to exit.
    ///
    /// Returns `false` if the scheduler was not running.
    pub async fn stop(&self) -> bool {
        let handle = {
            let mut running = self.running.lock();
            let Some(handle) = running.take() else {
                return false;
            };
            let cancelled = self.queue.close_and_cancel();
            self.stats.record_cancelled(cancelled);
            let _ = handle.shutdown.send(true);
            if cancelled > 0 {
                info!(cancelled, "Cancelled queued requests on shutdown");
            }
            handle
        };

        if let Err(e) = handle.task.await {
            warn!("Batch scheduler task ended abnormally: {}", e);
        }
        info!("Batch scheduler stopped");
        true
    }

    /// Ask the loop to re-check the queue before its window deadline
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    pub(crate) fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Counters plus current queue depth
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            running: self.is_running(),
            queued_requests: self.queue.len(),
            queued_units: self.queue.units(),
            ..self.stats.snapshot()
        }
    }
}

impl Drop for BatchScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.running.get_mut().take() {
            self.stats.record_cancelled(self.queue.close_and_cancel());
            let _ = handle.shutdown.send(true);
        }
    }
}

struct Coalescer {
    backend: Arc<dyn InferenceBackend>,
    queue: Arc<BatchQueue>,
    policy: BatchPolicy,
    wake: Arc<Notify>,
    stats: Arc<SchedulerStats>,
}

impl Coalescer {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!("Batch scheduler loop running");

        loop {
            if shutdown_requested(&shutdown) {
                break;
            }

            let now = Instant::now();
            let evicted = self.queue.evict_expired(self.policy.request_timeout, now);
            self.stats.record_timeouts(evicted);

            let batch = self.queue.drain_batch(&self.policy, now);
            if batch.is_empty() {
                let deadline = self.queue.window_deadline(self.policy.max_batch_wait);
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = self.wake.notified() => {}
                    _ = wait_until(deadline) => {}
                }
                continue;
            }

            if self.dispatch(batch, &mut shutdown).await.is_break() {
                break;
            }
        }

        debug!("Batch scheduler loop exited");
    }

    async fn dispatch(
        &self,
        batch: Vec<PendingRequest>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ControlFlow<()> {
        let mut texts = Vec::new();
        let mut slots = Vec::with_capacity(batch.len());
        for request in batch {
            let (inputs, slot) = request.into_parts();
            texts.extend(inputs);
            slots.push(slot);
        }

        let units = texts.len();
        self.stats.record_batch(units);
        debug!(requests = slots.len(), units, "Dispatching batch");
        let started = Instant::now();

        // A panicking backend only fails this batch
        let backend = Arc::clone(&self.backend);
        let mut call = tokio::spawn(async move { backend.classify(texts).await });

        let mut sweep = tokio::time::interval(self.policy.sweep_interval());
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;
                joined = &mut call => {
                    break Some(joined.unwrap_or_else(|e| {
                        Err(BackendError::Other(format!("backend task failed: {}", e)))
                    }));
                }
                _ = shutdown.changed() => break None,
                _ = sweep.tick() => {
                    let evicted = self.queue.evict_expired(self.policy.request_timeout, Instant::now());
                    self.stats.record_timeouts(evicted);
                }
            }
        };

        match outcome {
            None => {
                call.abort();
                warn!(requests = slots.len(), "Cancelling in-flight batch on shutdown");
                self.stats.record_cancelled(slots.len());
                for slot in slots {
                    slot.complete(Err(BatchError::ShutdownCancelled));
                }
                ControlFlow::Break(())
            }
            Some(Ok(results)) if results.len() == units => {
                debug!(
                    requests = slots.len(),
                    units,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Batch completed"
                );
                distribute(slots, results);
                ControlFlow::Continue(())
            }
            Some(Ok(results)) => {
                self.fail(
                    slots,
                    BackendError::InvalidResponse(format!(
                        "backend returned {} results for {} inputs",
                        results.len(),
                        units
                    )),
                );
                ControlFlow::Continue(())
            }
            Some(Err(err)) => {
                self.fail(slots, err);
                ControlFlow::Continue(())
            }
        }
    }

    fn fail(&self, slots: Vec<ResultSlot>, err: BackendError) {
        warn!(requests = slots.len(), error = %err, "Backend call failed, failing whole batch");
        self.stats.record_backend_failure();

        let error = BatchError::backend(err);
        for slot in slots {
            slot.complete(Err(error.clone()));
        }
    }
}

/// Hand each request the contiguous run of results matching its inputs
fn distribute(slots: Vec<ResultSlot>, results: Vec<Classification>) {
    let mut results = results.into_iter();
    for slot in slots {
        let id = slot.id;
        let own: Vec<Classification> = results.by_ref().take(slot.units).collect();
        if !slot.complete(Ok(own)) {
            debug!(request_id = %id, "Caller went away before its result was ready");
        }
    }
}

fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
