//! MemoryStore - keeps results in memory behind a cloneable read handle

use std::sync::Arc;

use contracts::{ContractError, ResultStore, WorkResult};
use parking_lot::Mutex;
use tracing::debug;

/// In-memory result log
pub struct MemoryStore {
    name: String,
    results: Arc<Mutex<Vec<WorkResult>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Read handle that stays valid after the store moves into a sink
    pub fn handle(&self) -> MemoryStoreHandle {
        MemoryStoreHandle {
            results: Arc::clone(&self.results),
        }
    }
}

/// Shared view of a `MemoryStore`
#[derive(Debug, Clone)]
pub struct MemoryStoreHandle {
    results: Arc<Mutex<Vec<WorkResult>>>,
}

impl MemoryStoreHandle {
    /// Copy of every committed result, in commit order
    pub fn results(&self) -> Vec<WorkResult> {
        self.results.lock().clone()
    }

    /// Committed sequence numbers, in commit order
    pub fn sequences(&self) -> Vec<u64> {
        self.results.lock().iter().map(|r| r.sequence).collect()
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl ResultStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError> {
        self.results.lock().push(result.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(store = %self.name, results = self.results.lock().len(), "MemoryStore closed");
        Ok(())
    }
}
