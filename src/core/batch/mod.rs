//! Request batching for the inference backend
//!
//! Concurrent callers submit [`PendingRequest`]s into a shared
//! [`BatchQueue`]. A single [`BatchScheduler`] task drains the queue into
//! batches bounded by input-unit count and coalescing window, invokes the
//! backend once per batch and completes every request with its own slice of
//! the results.

mod queue;
mod scheduler;
mod stats;
mod types;


pub use queue::BatchQueue;
pub use scheduler::BatchScheduler;
pub use stats::{SchedulerStats, StatsSnapshot};
pub use types::{BatchError, BatchOutcome, BatchPolicy, PendingRequest, RequestId};
