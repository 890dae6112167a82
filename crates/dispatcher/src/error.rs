//! Dispatcher error types

use contracts::{ContractError, WorkerId};
use thiserror::Error;

/// Why a dispatcher discarded an item.
///
/// None of these stop the dispatcher; the item is counted and the loop
/// returns to idle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Pool had no registered workers
    #[error("no worker available for item {sequence}")]
    NoWorker { sequence: u64 },

    /// Worker returned an error, no result produced
    #[error("item {sequence} failed: {source}")]
    Processing {
        sequence: u64,
        #[source]
        source: ContractError,
    },

    /// Outbound queue refused the result
    #[error("result {sequence} from '{worker_id}' rejected by outbound queue: {source}")]
    Forward {
        sequence: u64,
        worker_id: WorkerId,
        #[source]
        source: ContractError,
    },
}

impl DispatchError {
    /// Metric label for the drop reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoWorker { .. } => "no_worker",
            Self::Processing { .. } => "processing_failed",
            Self::Forward { .. } => "forward_rejected",
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            Self::NoWorker { sequence }
            | Self::Processing { sequence, .. }
            | Self::Forward { sequence, .. } => *sequence,
        }
    }
}
