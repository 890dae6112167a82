//! Dispatcher - moves items from the inbound queue through a worker to the
//! outbound queue

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use contracts::{ContractError, Worker, WorkItem, WorkResult};
use observability::metrics::{
    record_item_dispatched, record_item_dropped, record_processing_latency_ms, record_queue_depth,
};
use observability::RunningStats;
use work_queue::BoundedQueue;
use worker_pool::WorkerPool;

use crate::error::DispatchError;
use crate::metrics::DispatcherMetrics;

/// Per-item lifecycle of a dispatcher.
///
/// `Idle -> Dequeued -> Selected -> Processed -> Forwarded -> Idle`, any drop
/// returns straight to `Idle`. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatcherState {
    #[default]
    Idle,
    Dequeued,
    Selected,
    Processed,
    Forwarded,
    Stopped,
}

/// What one dispatcher task did over its lifetime
#[derive(Debug, Clone, Default)]
pub struct DispatcherReport {
    /// Task index within its group
    pub index: usize,
    pub dequeued: u64,
    pub forwarded: u64,
    pub dropped: u64,
    /// Worker processing time (ms)
    pub latency: RunningStats,
}

/// A single dispatcher task
pub struct Dispatcher {
    index: usize,
    inbound: Arc<BoundedQueue<WorkItem>>,
    outbound: Arc<BoundedQueue<WorkResult>>,
    pool: Arc<WorkerPool>,
    metrics: Arc<DispatcherMetrics>,
    state: DispatcherState,
    report: DispatcherReport,
}

impl Dispatcher {
    /// Create a dispatcher over a queue pair
    pub fn new(
        index: usize,
        inbound: Arc<BoundedQueue<WorkItem>>,
        outbound: Arc<BoundedQueue<WorkResult>>,
        pool: Arc<WorkerPool>,
        metrics: Arc<DispatcherMetrics>,
    ) -> Self {
        Self {
            index,
            inbound,
            outbound,
            pool,
            metrics,
            state: DispatcherState::Idle,
            report: DispatcherReport {
                index,
                ..Default::default()
            },
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn metrics(&self) -> &Arc<DispatcherMetrics> {
        &self.metrics
    }

    /// Run the dispatcher main loop
    ///
    /// Returns once the inbound queue is closed and drained.
    #[instrument(name = "dispatcher_run", skip(self), fields(dispatcher = self.index))]
    pub async fn run(mut self) -> DispatcherReport {
        info!(
            workers = self.pool.len(),
            inbound = %self.inbound.name(),
            outbound = %self.outbound.name(),
            "Dispatcher started"
        );

        while self.step().await {
            if self.report.dequeued.is_multiple_of(100) {
                debug!(items = self.report.dequeued, "Dispatcher progress");
            }
        }

        info!(
            dequeued = self.report.dequeued,
            forwarded = self.report.forwarded,
            dropped = self.report.dropped,
            "Dispatcher inbound closed, stopped"
        );

        self.report
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<DispatcherReport> {
        tokio::spawn(self.run())
    }

    /// Drive one item through the state machine.
    ///
    /// Returns `false` once the dispatcher has stopped.
    pub async fn step(&mut self) -> bool {
        if self.state == DispatcherState::Stopped {
            return false;
        }

        let Some(item) = self.inbound.dequeue().await else {
            self.transition(DispatcherState::Stopped);
            return false;
        };
        self.transition(DispatcherState::Dequeued);
        self.metrics.inc_dequeued();
        self.report.dequeued += 1;

        if let Err(e) = self.dispatch(item).await {
            self.record_drop(&e);
        }

        self.transition(DispatcherState::Idle);
        true
    }

    async fn dispatch(&mut self, item: WorkItem) -> Result<(), DispatchError> {
        let sequence = item.sequence();

        let worker = self
            .pool
            .select()
            .map_err(|_| DispatchError::NoWorker { sequence })?;
        self.transition(DispatcherState::Selected);

        let started = Instant::now();
        let outcome = process_isolated(worker.as_ref(), &item)
            .map_err(|source| DispatchError::Processing { sequence, source })?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.report.latency.push(elapsed_ms);
        self.metrics.inc_processed();
        record_processing_latency_ms(worker.id(), elapsed_ms);
        record_item_dispatched(worker.id());
        self.transition(DispatcherState::Processed);

        let result = WorkResult::new(worker.id().clone(), &item, outcome);
        self.outbound
            .enqueue(result)
            .await
            .map_err(|e| DispatchError::Forward {
                sequence,
                worker_id: worker.id().clone(),
                source: e.into_contract(self.outbound.name()),
            })?;

        self.metrics.inc_forwarded();
        self.report.forwarded += 1;
        record_queue_depth(self.outbound.name(), self.outbound.len());
        self.transition(DispatcherState::Forwarded);
        Ok(())
    }

    fn record_drop(&mut self, err: &DispatchError) {
        match err {
            DispatchError::NoWorker { .. } => self.metrics.inc_no_worker_drops(),
            DispatchError::Processing { .. } => self.metrics.inc_processing_failures(),
            DispatchError::Forward { .. } => self.metrics.inc_forward_failures(),
        }
        self.report.dropped += 1;
        record_item_dropped(err.reason());
        warn!(
            dispatcher = self.index,
            sequence = err.sequence(),
            reason = err.reason(),
            error = %err,
            "Item dropped"
        );
    }

    fn transition(&mut self, next: DispatcherState) {
        trace!(dispatcher = self.index, from = ?self.state, to = ?next, "state");
        self.state = next;
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("index", &self.index)
            .field("state", &self.state)
            .field("inbound", &self.inbound.name())
            .field("outbound", &self.outbound.name())
            .finish()
    }
}

/// Run the worker, turning a panic into a processing error for this item
fn process_isolated(worker: &dyn Worker, item: &WorkItem) -> Result<String, ContractError> {
    panic::catch_unwind(AssertUnwindSafe(|| worker.process(item.payload()))).unwrap_or_else(
        |panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ContractError::processing(
                worker.id(),
                format!("worker panicked: {message}"),
            ))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{BackpressurePolicy, ContractError, SelectionPolicy, Worker, WorkerId};
    use worker_pool::EchoWorker;

    /// Worker that fails on payloads starting with "bad"
    struct PickyWorker {
        id: WorkerId,
    }

    impl Worker for PickyWorker {
        fn id(&self) -> &WorkerId {
            &self.id
        }

        fn process(&self, payload: &Bytes) -> Result<String, ContractError> {
            if payload.starts_with(b"bad") {
                return Err(ContractError::processing(&self.id, "refused"));
            }
            Ok("ok".to_string())
        }
    }

    fn queues(
        outbound_capacity: usize,
        backpressure: BackpressurePolicy,
    ) -> (Arc<BoundedQueue<WorkItem>>, Arc<BoundedQueue<WorkResult>>) {
        (
            Arc::new(BoundedQueue::unbounded("inbound")),
            Arc::new(BoundedQueue::bounded(
                "outbound",
                outbound_capacity,
                backpressure,
            )),
        )
    }

    fn dispatcher_with(
        pool: WorkerPool,
        inbound: &Arc<BoundedQueue<WorkItem>>,
        outbound: &Arc<BoundedQueue<WorkResult>>,
    ) -> Dispatcher {
        Dispatcher::new(
            0,
            Arc::clone(inbound),
            Arc::clone(outbound),
            Arc::new(pool),
            Arc::new(DispatcherMetrics::new()),
        )
    }

    fn echo_pool(ids: &[&str]) -> WorkerPool {
        let mut pool = WorkerPool::new(SelectionPolicy::RoundRobin, None);
        for id in ids {
            pool.register(Arc::new(EchoWorker::new(*id))).unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_step_walks_states() {
        let (inbound, outbound) = queues(4, BackpressurePolicy::Block);
        let mut dispatcher = dispatcher_with(echo_pool(&["SVC1"]), &inbound, &outbound);
        assert_eq!(dispatcher.state(), DispatcherState::Idle);

        inbound.enqueue(WorkItem::new(1, "request #1")).await.unwrap();
        assert!(dispatcher.step().await);
        assert_eq!(dispatcher.state(), DispatcherState::Idle);

        let result = outbound.try_dequeue().unwrap();
        assert_eq!(result.sequence, 1);
        assert_eq!(result.outcome, "SVC1 processed request: request #1");

        inbound.close();
        assert!(!dispatcher.step().await);
        assert_eq!(dispatcher.state(), DispatcherState::Stopped);
        assert!(!dispatcher.step().await);
    }

    #[tokio::test]
    async fn test_run_forwards_all_in_order() {
        let (inbound, outbound) = queues(16, BackpressurePolicy::Block);
        let dispatcher = dispatcher_with(echo_pool(&["A", "B"]), &inbound, &outbound);

        for i in 0..10 {
            inbound
                .enqueue(WorkItem::new(i, format!("request #{i}")))
                .await
                .unwrap();
        }
        inbound.close();

        let report = dispatcher.run().await;
        assert_eq!(report.dequeued, 10);
        assert_eq!(report.forwarded, 10);
        assert_eq!(report.dropped, 0);
        assert_eq!(report.latency.count(), 10);

        // Single dispatcher preserves FIFO; round robin alternates workers
        let mut sequences = Vec::new();
        while let Ok(result) = outbound.try_dequeue() {
            let expected = if result.sequence % 2 == 0 { "A" } else { "B" };
            assert_eq!(result.worker_id, expected);
            sequences.push(result.sequence);
        }
        assert_eq!(sequences, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_pool_drops_and_continues() {
        let (inbound, outbound) = queues(4, BackpressurePolicy::Block);
        let dispatcher = dispatcher_with(echo_pool(&[]), &inbound, &outbound);
        let metrics = Arc::clone(dispatcher.metrics());

        for i in 0..3 {
            inbound.enqueue(WorkItem::new(i, "x")).await.unwrap();
        }
        inbound.close();

        let report = dispatcher.run().await;
        assert_eq!(report.dequeued, 3);
        assert_eq!(report.dropped, 3);
        assert_eq!(metrics.no_worker_drops(), 3);
        assert!(outbound.is_empty());
    }

    #[tokio::test]
    async fn test_processing_failure_skips_result() {
        let (inbound, outbound) = queues(8, BackpressurePolicy::Block);
        let mut pool = WorkerPool::new(SelectionPolicy::RoundRobin, None);
        pool.register(Arc::new(PickyWorker { id: "picky".into() }))
            .unwrap();
        let dispatcher = dispatcher_with(pool, &inbound, &outbound);
        let metrics = Arc::clone(dispatcher.metrics());

        for (i, payload) in ["good", "bad", "good"].into_iter().enumerate() {
            inbound
                .enqueue(WorkItem::new(i as u64, payload))
                .await
                .unwrap();
        }
        inbound.close();
        dispatcher.run().await;

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.dequeued, 3);
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.forwarded, 2);
        assert_eq!(snapshot.processing_failures, 1);
        assert_eq!(outbound.len(), 2);
    }

    #[tokio::test]
    async fn test_rejecting_outbound_drops_result() {
        let (inbound, outbound) = queues(1, BackpressurePolicy::Reject);
        let dispatcher = dispatcher_with(echo_pool(&["SVC1"]), &inbound, &outbound);
        let metrics = Arc::clone(dispatcher.metrics());

        for i in 0..3 {
            inbound.enqueue(WorkItem::new(i, "x")).await.unwrap();
        }
        inbound.close();
        dispatcher.run().await;

        // Nothing drains outbound: first result fits, the rest are refused
        assert_eq!(outbound.len(), 1);
        assert_eq!(metrics.forwarded(), 1);
        assert_eq!(metrics.forward_failures(), 2);
        assert_eq!(metrics.snapshot().dropped(), 2);
    }

    #[tokio::test]
    async fn test_closed_outbound_drops_result() {
        let (inbound, outbound) = queues(4, BackpressurePolicy::Block);
        let dispatcher = dispatcher_with(echo_pool(&["SVC1"]), &inbound, &outbound);
        let metrics = Arc::clone(dispatcher.metrics());

        outbound.close();
        inbound.enqueue(WorkItem::new(0, "x")).await.unwrap();
        inbound.close();
        dispatcher.run().await;

        assert_eq!(metrics.forward_failures(), 1);
        assert_eq!(metrics.processed(), 1);
    }

    #[tokio::test]
    async fn test_panicking_worker_counts_as_failure() {
        struct PanickyWorker {
            id: WorkerId,
        }

        impl Worker for PanickyWorker {
            fn id(&self) -> &WorkerId {
                &self.id
            }

            fn process(&self, payload: &Bytes) -> Result<String, ContractError> {
                if payload.starts_with(b"boom") {
                    panic!("exploded on {}", String::from_utf8_lossy(payload));
                }
                Ok("ok".to_string())
            }
        }

        let (inbound, outbound) = queues(8, BackpressurePolicy::Block);
        let mut pool = WorkerPool::new(SelectionPolicy::RoundRobin, None);
        pool.register(Arc::new(PanickyWorker { id: "panicky".into() }))
            .unwrap();
        let dispatcher = dispatcher_with(pool, &inbound, &outbound);
        let metrics = Arc::clone(dispatcher.metrics());

        for (i, payload) in ["good", "boom", "good"].into_iter().enumerate() {
            inbound
                .enqueue(WorkItem::new(i as u64, payload))
                .await
                .unwrap();
        }
        inbound.close();

        // The task survives the panic and keeps draining
        let report = dispatcher.spawn().await.unwrap();
        assert_eq!(report.dequeued, 3);
        assert_eq!(report.forwarded, 2);
        assert_eq!(metrics.processing_failures(), 1);
        assert_eq!(outbound.len(), 2);
    }
}
