//! Worker trait - the processing capability behind the dispatcher

use bytes::Bytes;

use crate::{ContractError, WorkerId};

/// Interchangeable processing unit.
///
/// Workers are registered once into a `WorkerPool` and shared as
/// `Arc<dyn Worker>` across dispatcher tasks, hence `Send + Sync` and an
/// object-safe, synchronous `process`.
///
/// `process` must not touch the pipeline queues: a worker that enqueues into
/// the queue it is fed from can deadlock the pipeline under backpressure.
/// External side effects (logging, I/O) are allowed.
pub trait Worker: Send + Sync {
    /// Stable worker identity
    fn id(&self) -> &WorkerId;

    /// Transform a payload into a human-readable outcome
    ///
    /// # Errors
    /// Returns `ContractError::Processing` for worker-local failures; the
    /// dispatcher drops the item and keeps running.
    fn process(&self, payload: &Bytes) -> Result<String, ContractError>;
}
