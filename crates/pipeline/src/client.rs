//! Client - submits payloads into the inbound queue

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use contracts::{ContractError, WorkItem};
use observability::metrics::{record_item_submitted, record_submit_rejected};
use work_queue::{BoundedQueue, EnqueueError};

/// Producer handle for one pipeline.
///
/// Cheap to clone. Every clone draws from the same sequence counter, so
/// sequence numbers are unique across all clients of a pipeline. A rejected
/// submit still consumes its number.
#[derive(Clone)]
pub struct Client {
    inbound: Arc<BoundedQueue<WorkItem>>,
    next_sequence: Arc<AtomicU64>,
}

impl Client {
    pub(crate) fn new(inbound: Arc<BoundedQueue<WorkItem>>) -> Self {
        Self {
            inbound,
            next_sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submit a payload under the inbound queue's backpressure policy
    ///
    /// Suspends while the queue is full under `Block`. No retry is attempted.
    ///
    /// # Errors
    /// - `QueueFull`: full under `Reject`
    /// - `QueueClosed`: pipeline stopping or stopped
    pub async fn submit(&self, payload: impl Into<Bytes>) -> Result<u64, ContractError> {
        let item = self.next_item(payload);
        let sequence = item.sequence();
        let outcome = self.inbound.enqueue(item).await;
        self.finish(sequence, outcome)
    }

    /// Submit without ever suspending; rejects whenever the queue is full
    ///
    /// # Errors
    /// Same as [`Client::submit`]
    pub fn try_submit(&self, payload: impl Into<Bytes>) -> Result<u64, ContractError> {
        let item = self.next_item(payload);
        let sequence = item.sequence();
        let outcome = self.inbound.try_enqueue(item);
        self.finish(sequence, outcome)
    }

    /// Inbound queue depth (snapshot)
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Whether the pipeline still accepts submissions
    pub fn is_open(&self) -> bool {
        !self.inbound.is_closed()
    }

    fn next_item(&self, payload: impl Into<Bytes>) -> WorkItem {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        WorkItem::new(sequence, payload)
    }

    fn finish(
        &self,
        sequence: u64,
        outcome: Result<(), EnqueueError<WorkItem>>,
    ) -> Result<u64, ContractError> {
        match outcome {
            Ok(()) => {
                record_item_submitted(self.inbound.name());
                trace!(sequence, "Item submitted");
                Ok(sequence)
            }
            Err(e) => {
                let reason = if e.is_full() { "full" } else { "closed" };
                record_submit_rejected(self.inbound.name(), reason);
                debug!(sequence, reason, "Submit rejected");
                Err(e.into_contract(self.inbound.name()))
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("inbound", &self.inbound.name())
            .field("next_sequence", &self.next_sequence.load(Ordering::Relaxed))
            .finish()
    }
}
