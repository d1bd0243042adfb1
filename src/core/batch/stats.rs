//! Scheduler counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the scheduler loop
#[derive(Debug, Default)]
pub struct SchedulerStats {
    batches: AtomicU64,
    units: AtomicU64,
    largest_batch: AtomicU64,
    backend_failures: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
}

/// Point-in-time copy of [`SchedulerStats`] plus queue depth
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub running: bool,
    pub queued_requests: usize,
    pub queued_units: usize,
    pub batches_dispatched: u64,
    pub units_dispatched: u64,
    pub largest_batch: u64,
    pub backend_failures: u64,
    pub requests_timed_out: u64,
    pub requests_cancelled: u64,
}

impl SchedulerStats {
    pub(crate) fn record_batch(&self, units: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.units.fetch_add(units as u64, Ordering::Relaxed);
        self.largest_batch.fetch_max(units as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeouts(&self, count: usize) {
        if count > 0 {
            self.timed_out.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_cancelled(&self, count: usize) {
        if count > 0 {
            self.cancelled.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batches_dispatched: self.batches.load(Ordering::Relaxed),
            units_dispatched: self.units.load(Ordering::Relaxed),
            largest_batch: self.largest_batch.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
            requests_timed_out: self.timed_out.load(Ordering::Relaxed),
            requests_cancelled: self.cancelled.load(Ordering::Relaxed),
            ..StatsSnapshot::default()
        }
    }
}
