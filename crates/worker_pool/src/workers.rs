//! Built-in workers

use std::sync::Arc;

use bytes::Bytes;
use contracts::{ContractError, Worker, WorkerConfig, WorkerId, WorkerKind};
use tracing::debug;

/// Reports `<id> processed request: <payload>`
#[derive(Debug, Clone)]
pub struct EchoWorker {
    id: WorkerId,
}

impl EchoWorker {
    pub fn new(id: impl Into<WorkerId>) -> Self {
        Self { id: id.into() }
    }
}

impl Worker for EchoWorker {
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn process(&self, payload: &Bytes) -> Result<String, ContractError> {
        let request = String::from_utf8_lossy(payload);
        debug!(worker_id = %self.id, request = %request, "Processing request");
        Ok(format!("{} processed request: {}", self.id, request))
    }
}

/// Upper-cases UTF-8 payloads, rejects anything else
#[derive(Debug, Clone)]
pub struct UppercaseWorker {
    id: WorkerId,
}

impl UppercaseWorker {
    pub fn new(id: impl Into<WorkerId>) -> Self {
        Self { id: id.into() }
    }
}

impl Worker for UppercaseWorker {
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn process(&self, payload: &Bytes) -> Result<String, ContractError> {
        let text = std::str::from_utf8(payload).map_err(|e| {
            ContractError::processing(&self.id, format!("payload is not UTF-8: {e}"))
        })?;
        Ok(text.to_uppercase())
    }
}

/// Create a built-in worker from configuration
pub fn build_worker(config: &WorkerConfig) -> Arc<dyn Worker> {
    match config.kind {
        WorkerKind::Echo => Arc::new(EchoWorker::new(config.id.clone())),
        WorkerKind::Uppercase => Arc::new(UppercaseWorker::new(config.id.clone())),
    }
}
