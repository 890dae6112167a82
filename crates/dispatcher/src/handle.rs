//! DispatcherGroup - N dispatcher tasks sharing one queue pair

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{WorkItem, WorkResult};
use observability::RunningStats;
use work_queue::BoundedQueue;
use worker_pool::WorkerPool;

use crate::dispatcher::{Dispatcher, DispatcherReport};
use crate::metrics::DispatcherMetrics;

/// Handle to a set of running dispatcher tasks
pub struct DispatcherGroup {
    /// Shared counters across all tasks
    metrics: Arc<DispatcherMetrics>,
    /// Task handles, in index order
    handles: Vec<JoinHandle<DispatcherReport>>,
}

impl DispatcherGroup {
    /// Spawn `count` dispatchers over the same queues and pool
    ///
    /// At least one dispatcher is always started.
    #[instrument(
        name = "dispatcher_group_spawn",
        skip(inbound, outbound, pool),
        fields(inbound = %inbound.name(), outbound = %outbound.name())
    )]
    pub fn spawn(
        count: usize,
        inbound: Arc<BoundedQueue<WorkItem>>,
        outbound: Arc<BoundedQueue<WorkResult>>,
        pool: Arc<WorkerPool>,
    ) -> Self {
        if count == 0 {
            warn!("Dispatcher count is zero, starting one");
        }
        let count = count.max(1);
        let metrics = Arc::new(DispatcherMetrics::new());

        let handles = (0..count)
            .map(|index| {
                Dispatcher::new(
                    index,
                    Arc::clone(&inbound),
                    Arc::clone(&outbound),
                    Arc::clone(&pool),
                    Arc::clone(&metrics),
                )
                .spawn()
            })
            .collect();

        info!(dispatchers = count, "Dispatcher group started");
        Self { metrics, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<DispatcherMetrics> {
        &self.metrics
    }

    /// Wait for every dispatcher to stop
    ///
    /// Only returns once the inbound queue has been closed and drained. A
    /// panicked task is logged and left out of the reports.
    #[instrument(name = "dispatcher_group_join", skip(self))]
    pub async fn join(self) -> Vec<DispatcherReport> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for (index, handle) in self.handles.into_iter().enumerate() {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => error!(dispatcher = index, error = ?e, "Dispatcher task panicked"),
            }
        }
        debug!(stopped = reports.len(), "Dispatcher group joined");
        reports
    }
}

/// Combine per-task latency statistics
pub fn merged_latency(reports: &[DispatcherReport]) -> RunningStats {
    let mut merged = RunningStats::default();
    for report in reports {
        merged.merge(&report.latency);
    }
    merged
}
