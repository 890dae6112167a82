//! WorkerPool - registry of interchangeable workers

use std::sync::Arc;

use contracts::{ContractError, PoolConfig, SelectionPolicy, Worker, WorkerConfig, WorkerId};
use tracing::{debug, info, instrument, trace};

use crate::strategy::{strategy_for, SelectionStrategy};
use crate::workers::build_worker;

/// Registry of workers plus a selection strategy.
///
/// Workers are registered at startup through `&mut self`; afterwards the pool
/// is shared read-only (`Arc<WorkerPool>`) and only the strategy's internal
/// state changes.
pub struct WorkerPool {
    workers: Vec<Arc<dyn Worker>>,
    strategy: Box<dyn SelectionStrategy>,
}

impl WorkerPool {
    /// Create an empty pool for a configured policy
    pub fn new(policy: SelectionPolicy, seed: Option<u64>) -> Self {
        Self::with_strategy(strategy_for(policy, seed))
    }

    /// Create an empty pool with a custom strategy
    pub fn with_strategy(strategy: Box<dyn SelectionStrategy>) -> Self {
        Self {
            workers: Vec::new(),
            strategy,
        }
    }

    /// Build a pool of built-in workers from configuration
    ///
    /// # Errors
    /// `DuplicateWorker` if two configs share an id
    #[instrument(
        name = "worker_pool_from_config",
        skip(config, workers),
        fields(policy = ?config.policy, workers = workers.len())
    )]
    pub fn from_config(
        config: &PoolConfig,
        workers: &[WorkerConfig],
    ) -> Result<Self, ContractError> {
        let mut pool = Self::new(config.policy, config.seed);
        for worker_config in workers {
            pool.register(build_worker(worker_config))?;
        }
        info!(
            workers = pool.len(),
            strategy = pool.strategy_name(),
            "Worker pool ready"
        );
        Ok(pool)
    }

    /// Register a worker
    ///
    /// # Errors
    /// `DuplicateWorker` if a worker with the same id is already registered
    pub fn register(&mut self, worker: Arc<dyn Worker>) -> Result<(), ContractError> {
        if self.contains(worker.id()) {
            return Err(ContractError::DuplicateWorker {
                worker_id: worker.id().clone(),
            });
        }
        debug!(worker_id = %worker.id(), "registered worker");
        self.workers.push(worker);
        Ok(())
    }

    /// Pick a worker according to the strategy
    ///
    /// The returned handle is independent of the pool's internal state, so
    /// the caller invokes the worker without holding any pool lock.
    ///
    /// # Errors
    /// `NoWorkersAvailable` on an empty pool
    pub fn select(&self) -> Result<Arc<dyn Worker>, ContractError> {
        if self.workers.is_empty() {
            return Err(ContractError::NoWorkersAvailable);
        }
        let len = self.workers.len();
        // Out-of-range picks from a custom strategy wrap around
        let index = self.strategy.next_index(len) % len;
        let worker = &self.workers[index];
        trace!(
            worker_id = %worker.id(),
            index,
            strategy = self.strategy.name(),
            "selected worker"
        );
        Ok(Arc::clone(worker))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.workers.iter().any(|w| w.id() == id)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Registered ids, in registration order
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers.iter().map(|w| w.id().clone()).collect()
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.worker_ids())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
