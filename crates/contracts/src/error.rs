//! Layered error definitions
//!
//! Categorized by stage: config / queue / pool / worker / store

use thiserror::Error;

use crate::WorkerId;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Queue Errors =====
    /// Bounded queue at capacity under the reject policy
    #[error("queue '{queue}' is full")]
    QueueFull { queue: String },

    /// Queue no longer accepts items (pipeline stopping)
    #[error("queue '{queue}' is closed")]
    QueueClosed { queue: String },

    // ===== Worker Pool Errors =====
    /// A worker with the same id is already registered
    #[error("duplicate worker id '{worker_id}'")]
    DuplicateWorker { worker_id: WorkerId },

    /// Selection on an empty pool
    #[error("no workers available")]
    NoWorkersAvailable,

    // ===== Worker Errors =====
    /// Worker-local processing failure
    #[error("worker '{worker_id}' failed to process item: {message}")]
    Processing { worker_id: WorkerId, message: String },

    // ===== Store Errors =====
    /// Store commit failure
    #[error("store '{store}' error: {message}")]
    Store { store: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create queue full error
    pub fn queue_full(queue: impl Into<String>) -> Self {
        Self::QueueFull {
            queue: queue.into(),
        }
    }

    /// Create queue closed error
    pub fn queue_closed(queue: impl Into<String>) -> Self {
        Self::QueueClosed {
            queue: queue.into(),
        }
    }

    /// Create processing error
    pub fn processing(worker_id: &WorkerId, message: impl Into<String>) -> Self {
        Self::Processing {
            worker_id: worker_id.clone(),
            message: message.into(),
        }
    }

    /// Create store error
    pub fn store(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Transient errors the caller may retry (backpressure only)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}
