//! Queue error types
//!
//! Enqueue errors hand the rejected item back so the caller can decide
//! whether to retry.

use std::fmt;

use contracts::ContractError;
use thiserror::Error;

/// Enqueue failure, carrying the rejected item
#[derive(PartialEq, Eq)]
pub enum EnqueueError<T> {
    /// Bounded queue at capacity
    Full(T),
    /// Queue closed, no further items accepted
    Closed(T),
}

impl<T> EnqueueError<T> {
    /// Recover the rejected item
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }

    /// Whether the failure was caused by backpressure
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Map onto the shared error taxonomy (drops the item)
    pub fn into_contract(self, queue: &str) -> ContractError {
        match self {
            Self::Full(_) => ContractError::queue_full(queue),
            Self::Closed(_) => ContractError::queue_closed(queue),
        }
    }
}

impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("queue is full"),
            Self::Closed(_) => f.write_str("queue is closed"),
        }
    }
}

impl<T> std::error::Error for EnqueueError<T> {}

/// Non-suspending dequeue found nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryDequeueError {
    /// No item right now, more may arrive
    #[error("queue is empty")]
    Empty,
    /// Closed and drained, no item will ever arrive
    #[error("queue is closed")]
    Closed,
}
