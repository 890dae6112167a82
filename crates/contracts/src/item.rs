//! WorkItem / WorkResult - the two payloads flowing through the pipeline
//!
//! `WorkItem` travels the inbound queue, `WorkResult` the outbound queue.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::WorkerId;

/// Unit of work submitted by a client.
///
/// Immutable once created; ownership moves client -> queue -> dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Submission sequence number (unique per pipeline, increasing per client)
    sequence: u64,

    /// Opaque payload (zero-copy)
    payload: Bytes,
}

impl WorkItem {
    /// Create a work item
    pub fn new(sequence: u64, payload: impl Into<Bytes>) -> Self {
        Self {
            sequence,
            payload: payload.into(),
        }
    }

    /// Submission sequence number
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Payload bytes
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

/// Output of processing one `WorkItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkResult {
    /// Worker that produced this result
    pub worker_id: WorkerId,

    /// Sequence number of the originating item
    pub sequence: u64,

    /// Original payload
    pub payload: Bytes,

    /// Human-readable outcome
    pub outcome: String,
}

impl WorkResult {
    /// Pair a worker outcome with the item it was computed from
    pub fn new(worker_id: WorkerId, item: &WorkItem, outcome: impl Into<String>) -> Self {
        Self {
            worker_id,
            sequence: item.sequence(),
            // Bytes clone is a refcount bump
            payload: item.payload().clone(),
            outcome: outcome.into(),
        }
    }

    /// Payload rendered as (lossy) UTF-8, for logs and text stores
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
