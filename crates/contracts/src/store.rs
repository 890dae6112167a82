//! ResultStore trait - OutputSink persistence interface
//!
//! Defines the abstract interface for result stores.

use crate::{ContractError, WorkResult};

/// Result persistence trait
///
/// All store implementations must implement this trait. A store is owned by
/// exactly one `OutputSink`, so methods take `&mut self`.
#[trait_variant::make(ResultStore: Send)]
pub trait LocalResultStore {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one result
    ///
    /// # Errors
    /// Returns `ContractError::Store`; the sink logs it and moves on, the
    /// result is not retried.
    async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError>;

    /// Flush buffered writes (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close store
    async fn close(&mut self) -> Result<(), ContractError>;
}
