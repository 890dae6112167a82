//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete pipeline: queue capacities and backpressure, number
//! of dispatcher tasks, worker selection policy, registered workers and the
//! result store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::WorkerId;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Client -> Dispatcher queue
    #[serde(default)]
    pub inbound: QueueConfig,

    /// Dispatcher -> Sink queue
    #[serde(default)]
    pub outbound: QueueConfig,

    /// Dispatcher settings
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Worker selection settings
    #[serde(default)]
    pub pool: PoolConfig,

    /// Workers registered at startup
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,

    /// Result store
    #[serde(default)]
    pub store: StoreConfig,
}

/// Queue capacity and backpressure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum queued items (None = unbounded)
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Policy applied when the queue is full
    #[serde(default)]
    pub backpressure: BackpressurePolicy,
}

impl QueueConfig {
    /// Bounded queue with the given policy
    pub fn bounded(capacity: usize, backpressure: BackpressurePolicy) -> Self {
        Self {
            capacity: Some(capacity),
            backpressure,
        }
    }

    /// Unbounded queue (backpressure never triggers)
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Backpressure policy (when a bounded queue is full)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Suspend the producer until space is available
    #[default]
    Block,
    /// Fail immediately with `QueueFull`
    Reject,
}

/// Dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Number of dispatcher tasks sharing the queue pair
    #[serde(default = "default_dispatcher_tasks")]
    pub tasks: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            tasks: default_dispatcher_tasks(),
        }
    }
}

fn default_dispatcher_tasks() -> usize {
    1
}

/// Worker selection settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Selection policy
    #[serde(default)]
    pub policy: SelectionPolicy,

    /// Seed for the random policy (None = seeded from the OS)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Worker selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Uniform random choice
    #[default]
    Random,
    /// Deterministic rotation in registration order
    RoundRobin,
}

/// Worker definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Unique identifier
    pub id: WorkerId,

    /// Built-in worker implementation
    #[serde(default)]
    pub kind: WorkerKind,
}

/// Built-in worker kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Reports `<id> processed request: <payload>`
    #[default]
    Echo,
    /// Upper-cases UTF-8 payloads
    Uppercase,
}

/// Result store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store name
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Store type
    #[serde(default)]
    pub store_type: StoreType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            store_type: StoreType::default(),
            params: HashMap::new(),
        }
    }
}

fn default_store_name() -> String {
    "results".to_string()
}

/// Store type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Log output
    #[default]
    Log,
    /// JSON-lines file
    File,
    /// In-memory log
    Memory,
}
