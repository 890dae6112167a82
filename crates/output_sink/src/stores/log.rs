//! LogStore - records each result via tracing

use contracts::{ContractError, ResultStore, WorkResult};
use tracing::{info, instrument};

/// Store that logs every committed result
pub struct LogStore {
    name: String,
    committed: u64,
}

impl LogStore {
    /// Create a new LogStore with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            committed: 0,
        }
    }

    pub fn committed(&self) -> u64 {
        self.committed
    }
}

impl ResultStore for LogStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_store_commit",
        skip(self, result),
        fields(store = %self.name, sequence = result.sequence)
    )]
    async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError> {
        self.committed += 1;
        info!(
            store = %self.name,
            sequence = result.sequence,
            worker_id = %result.worker_id,
            outcome = %result.outcome,
            "Result stored"
        );
        Ok(())
    }

    #[instrument(name = "log_store_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing buffered
        Ok(())
    }

    #[instrument(name = "log_store_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(store = %self.name, committed = self.committed, "LogStore closed");
        Ok(())
    }
}
