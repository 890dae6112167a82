//! # Work Queue
//!
//! Thread-safe FIFO queue connecting pipeline stages.
//!
//! Responsibilities:
//! - Strict FIFO ordering under concurrent producers and consumers
//! - Optional capacity with configurable backpressure (block / reject)
//! - Cooperative close: reject new items, drain what is queued
//!
//! ## Usage Example
//!
//! ```ignore
//! use work_queue::BoundedQueue;
//! use contracts::BackpressurePolicy;
//!
//! let queue = BoundedQueue::bounded("inbound", 10, BackpressurePolicy::Block);
//! queue.enqueue(item).await?;
//! while let Some(item) = queue.dequeue().await {
//!     // process
//! }
//! ```

mod error;
mod metrics;
mod queue;

pub use contracts::{BackpressurePolicy, QueueConfig};
pub use error::{EnqueueError, TryDequeueError};
pub use metrics::{QueueMetrics, QueueMetricsSnapshot};
pub use queue::BoundedQueue;
