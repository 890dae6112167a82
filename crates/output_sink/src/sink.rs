//! OutputSink - drains the outbound queue into a result store

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use contracts::{ResultStore, WorkResult};
use observability::metrics::{record_queue_depth, record_result_committed};
use work_queue::BoundedQueue;

use crate::metrics::SinkMetrics;

/// Final tally of a stopped sink
#[derive(Debug, Clone, Default)]
pub struct SinkReport {
    pub store: String,
    pub committed: u64,
    pub failures: u64,
    pub duration: Duration,
}

/// Consumer of the outbound queue.
///
/// Owns its store exclusively; the store is flushed and closed once the
/// queue is closed and drained.
pub struct OutputSink<S> {
    store: S,
    outbound: Arc<BoundedQueue<WorkResult>>,
    metrics: Arc<SinkMetrics>,
}

impl<S: ResultStore + Send + 'static> OutputSink<S> {
    pub fn new(store: S, outbound: Arc<BoundedQueue<WorkResult>>) -> Self {
        Self {
            store,
            outbound,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Spawn the sink as a background task
    pub fn spawn(self) -> JoinHandle<SinkReport> {
        tokio::spawn(self.run())
    }

    /// Run the commit loop until the outbound queue is closed and drained
    #[instrument(
        name = "output_sink_loop",
        skip(self),
        fields(store = %self.store.name(), queue = %self.outbound.name())
    )]
    pub async fn run(mut self) -> SinkReport {
        let started = Instant::now();
        let name = self.store.name().to_string();
        debug!(store = %name, "Output sink started");

        while let Some(result) = self.outbound.dequeue().await {
            record_queue_depth(self.outbound.name(), self.outbound.len());

            match self.store.commit(&result).await {
                Ok(()) => {
                    self.metrics.inc_committed();
                    record_result_committed(&name, true);
                }
                Err(e) => {
                    self.metrics.inc_failures();
                    record_result_committed(&name, false);
                    error!(
                        store = %name,
                        sequence = result.sequence,
                        worker_id = %result.worker_id,
                        error = %e,
                        "Commit failed, result dropped"
                    );
                }
            }
        }

        // Cleanup
        if let Err(e) = self.store.flush().await {
            error!(store = %name, error = %e, "Flush failed on shutdown");
        }
        if let Err(e) = self.store.close().await {
            error!(store = %name, error = %e, "Close failed on shutdown");
        }

        let snapshot = self.metrics.snapshot();
        info!(
            store = %name,
            committed = snapshot.committed,
            failures = snapshot.failures,
            "Output sink stopped"
        );

        SinkReport {
            store: name,
            committed: snapshot.committed,
            failures: snapshot.failures,
            duration: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use contracts::{BackpressurePolicy, ContractError, WorkItem};
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    /// Mock store for testing
    struct MockStore {
        name: String,
        commit_count: Arc<AtomicU64>,
        closed: Arc<AtomicBool>,
        fail_odd: bool,
        delay_ms: u64,
    }

    impl MockStore {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                commit_count: Arc::new(AtomicU64::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
                fail_odd: false,
                delay_ms: 0,
            }
        }
    }

    impl ResultStore for MockStore {
        fn name(&self) -> &str {
            &self.name
        }

        async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail_odd && result.sequence % 2 == 1 {
                return Err(ContractError::store(&self.name, "mock failure"));
            }
            self.commit_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    fn result(sequence: u64) -> WorkResult {
        WorkResult::new(
            "SVC1".into(),
            &WorkItem::new(sequence, format!("request #{sequence}")),
            "done",
        )
    }

    #[tokio::test]
    async fn test_sink_commits_and_closes() {
        let outbound = Arc::new(BoundedQueue::unbounded("outbound"));
        let store = MockStore::new("mock");
        let commit_count = Arc::clone(&store.commit_count);
        let closed = Arc::clone(&store.closed);

        let handle = OutputSink::new(store, Arc::clone(&outbound)).spawn();
        for i in 0..5 {
            outbound.enqueue(result(i)).await.unwrap();
        }
        outbound.close();

        let report = handle.await.unwrap();
        assert_eq!(report.store, "mock");
        assert_eq!(report.committed, 5);
        assert_eq!(report.failures, 0);
        assert_eq!(commit_count.load(Ordering::Relaxed), 5);
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_sink_failure_isolation() {
        let outbound = Arc::new(BoundedQueue::unbounded("outbound"));
        let mut store = MockStore::new("failing");
        store.fail_odd = true;

        let sink = OutputSink::new(store, Arc::clone(&outbound));
        let metrics = Arc::clone(sink.metrics());
        let handle = sink.spawn();

        for i in 0..6 {
            outbound.enqueue(result(i)).await.unwrap();
        }
        outbound.close();

        let report = handle.await.unwrap();
        assert_eq!(report.committed, 3);
        assert_eq!(report.failures, 3);
        assert_eq!(metrics.snapshot().failures, 3);
    }

    #[tokio::test]
    async fn test_slow_store_applies_backpressure() {
        let outbound = Arc::new(BoundedQueue::bounded("outbound", 2, BackpressurePolicy::Block));
        let mut store = MockStore::new("slow");
        store.delay_ms = 5;
        let commit_count = Arc::clone(&store.commit_count);

        let handle = OutputSink::new(store, Arc::clone(&outbound)).spawn();
        for i in 0..10 {
            outbound.enqueue(result(i)).await.unwrap();
            assert!(outbound.len() <= 2);
        }
        outbound.close();

        handle.await.unwrap();
        assert_eq!(commit_count.load(Ordering::Relaxed), 10);
        assert!(outbound.metrics().high_water() <= 2);
    }

    #[tokio::test]
    async fn test_sink_drains_before_stopping() {
        let outbound = Arc::new(BoundedQueue::unbounded("outbound"));
        for i in 0..20 {
            outbound.enqueue(result(i)).await.unwrap();
        }
        // Closed before the sink even starts: everything queued still lands
        outbound.close();

        let store = MemoryStore::new("memory");
        let view = store.handle();
        let report = OutputSink::new(store, outbound).run().await;

        assert_eq!(report.committed, 20);
        assert_eq!(view.sequences(), (0..20).collect::<Vec<_>>());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_file_store_write_errors_count_per_result() {
        use crate::stores::{FileStore, FileStoreConfig};

        let store = FileStore::new(
            "full",
            FileStoreConfig {
                path: "/dev/full".into(),
                append: true,
            },
        )
        .unwrap();

        let outbound = Arc::new(BoundedQueue::unbounded("outbound"));
        for i in 0..5 {
            outbound.enqueue(result(i)).await.unwrap();
        }
        outbound.close();

        let report = OutputSink::new(store, outbound).run().await;
        assert_eq!(report.committed, 0);
        assert_eq!(report.failures, 5);
    }
}
