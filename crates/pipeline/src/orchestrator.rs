//! Pipeline orchestrator - wires queues, dispatchers and the output sink.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use contracts::{ContractError, PipelineBlueprint, QueueConfig, ResultStore, WorkItem, WorkResult};
use dispatcher::{merged_latency, DispatcherGroup, DispatcherMetrics};
use output_sink::{OutputSink, SinkMetrics, SinkReport};
use work_queue::BoundedQueue;
use worker_pool::WorkerPool;

use crate::client::Client;
use crate::stats::PipelineReport;

/// Lifecycle of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Built, no task spawned yet
    #[default]
    Created,
    /// Accepting submissions
    Running,
    /// Inbound closed, draining
    Stopping,
    /// All tasks finished
    Stopped,
}

/// Pipeline configuration
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Client -> dispatcher queue
    pub inbound: QueueConfig,
    /// Dispatcher -> sink queue
    pub outbound: QueueConfig,
    /// Number of dispatcher tasks
    pub dispatchers: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            inbound: QueueConfig::default(),
            outbound: QueueConfig::default(),
            dispatchers: 1,
        }
    }
}

impl From<&PipelineBlueprint> for PipelineSettings {
    fn from(blueprint: &PipelineBlueprint) -> Self {
        Self {
            inbound: blueprint.inbound,
            outbound: blueprint.outbound,
            dispatchers: blueprint.dispatcher.tasks,
        }
    }
}

/// A configured, not yet started pipeline
#[derive(Debug)]
pub struct Pipeline {
    settings: PipelineSettings,
    pool: Arc<WorkerPool>,
}

impl Pipeline {
    /// Create a pipeline around an already populated pool
    pub fn new(settings: PipelineSettings, pool: WorkerPool) -> Self {
        Self {
            settings,
            pool: Arc::new(pool),
        }
    }

    /// Build settings and a pool of built-in workers from configuration
    ///
    /// # Errors
    /// `DuplicateWorker` if two workers share an id
    #[instrument(
        name = "pipeline_from_blueprint",
        skip(blueprint),
        fields(workers = blueprint.workers.len(), dispatchers = blueprint.dispatcher.tasks)
    )]
    pub fn from_blueprint(blueprint: &PipelineBlueprint) -> Result<Self, ContractError> {
        let pool = WorkerPool::from_config(&blueprint.pool, &blueprint.workers)?;
        Ok(Self::new(PipelineSettings::from(blueprint), pool))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::Created
    }

    /// Spawn the sink and dispatcher tasks
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    #[instrument(
        name = "pipeline_start",
        skip(self, store),
        fields(store = %store.name(), dispatchers = self.settings.dispatchers)
    )]
    pub fn start<S: ResultStore + Send + 'static>(self, store: S) -> PipelineHandle {
        if self.pool.is_empty() {
            warn!("Worker pool is empty - every submitted item will be dropped");
        }

        let inbound = Arc::new(BoundedQueue::new("inbound", self.settings.inbound));
        let outbound = Arc::new(BoundedQueue::new("outbound", self.settings.outbound));

        // Sink first so the outbound queue always has a consumer
        let sink = OutputSink::new(store, Arc::clone(&outbound));
        let sink_metrics = Arc::clone(sink.metrics());
        let store_name = sink.name().to_string();
        let sink_task = sink.spawn();

        let dispatchers = DispatcherGroup::spawn(
            self.settings.dispatchers,
            Arc::clone(&inbound),
            Arc::clone(&outbound),
            Arc::clone(&self.pool),
        );

        info!(
            workers = self.pool.len(),
            strategy = self.pool.strategy_name(),
            dispatchers = dispatchers.len(),
            inbound_capacity = ?inbound.capacity(),
            outbound_capacity = ?outbound.capacity(),
            store = %store_name,
            "Pipeline running"
        );

        PipelineHandle {
            client: Client::new(Arc::clone(&inbound)),
            inbound,
            outbound,
            dispatcher_metrics: Arc::clone(dispatchers.metrics()),
            dispatchers,
            sink_metrics,
            sink_task,
            store_name,
            started: Instant::now(),
        }
    }
}

/// Control surface of a running pipeline
///
/// Must be finished with [`PipelineHandle::stop`]; dropping it leaves the
/// tasks waiting on the inbound queue.
pub struct PipelineHandle {
    client: Client,
    inbound: Arc<BoundedQueue<WorkItem>>,
    outbound: Arc<BoundedQueue<WorkResult>>,
    dispatchers: DispatcherGroup,
    dispatcher_metrics: Arc<DispatcherMetrics>,
    sink_task: JoinHandle<SinkReport>,
    sink_metrics: Arc<SinkMetrics>,
    store_name: String,
    started: Instant,
}

impl PipelineHandle {
    /// Submit through the handle's own client
    ///
    /// # Errors
    /// See [`Client::submit`]
    pub async fn submit(&self, payload: impl Into<Bytes>) -> Result<u64, ContractError> {
        self.client.submit(payload).await
    }

    /// A client for concurrent producers
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn state(&self) -> PipelineState {
        if self.inbound.is_closed() {
            PipelineState::Stopping
        } else {
            PipelineState::Running
        }
    }

    /// Stop accepting submissions without waiting
    ///
    /// Items already queued keep flowing; the handle reports `Stopping`
    /// until [`PipelineHandle::stop`] has drained them. Returns `false` if
    /// the pipeline was already closed.
    pub fn close(&self) -> bool {
        let closed = self.inbound.close();
        if closed {
            info!(pending = self.inbound.len(), "Inbound closed, no further submissions");
        }
        closed
    }

    pub fn dispatcher_metrics(&self) -> &Arc<DispatcherMetrics> {
        &self.dispatcher_metrics
    }

    pub fn sink_metrics(&self) -> &Arc<SinkMetrics> {
        &self.sink_metrics
    }

    /// Cooperative shutdown
    ///
    /// Closes the inbound queue, waits for the dispatchers to drain it,
    /// closes the outbound queue and waits for the sink to drain that. No
    /// task is aborted, so every accepted item is either committed or
    /// counted as a failure in the report.
    #[instrument(name = "pipeline_stop", skip(self), fields(store = %self.store_name))]
    pub async fn stop(self) -> PipelineReport {
        let Self {
            client: _,
            inbound,
            outbound,
            dispatchers,
            dispatcher_metrics,
            sink_task,
            sink_metrics,
            store_name,
            started,
        } = self;

        info!(
            state = ?PipelineState::Stopping,
            pending = inbound.len(),
            "Stopping pipeline, draining inbound"
        );
        inbound.close();
        let reports = dispatchers.join().await;

        info!(pending = outbound.len(), "Dispatchers stopped, draining outbound");
        outbound.close();
        let sink = match sink_task.await {
            Ok(report) => report,
            Err(e) => {
                error!(store = %store_name, error = ?e, "Output sink task panicked");
                SinkReport {
                    store: store_name,
                    committed: sink_metrics.committed(),
                    failures: sink_metrics.failures(),
                    ..Default::default()
                }
            }
        };

        let dispatch = dispatcher_metrics.snapshot();
        let inbound_metrics = inbound.metrics().snapshot();
        let outbound_metrics = outbound.metrics().snapshot();

        let report = PipelineReport {
            state: PipelineState::Stopped,
            submitted: inbound_metrics.enqueued,
            rejected: inbound_metrics.rejected,
            processed: dispatch.processed,
            committed: sink.committed,
            no_worker_drops: dispatch.no_worker_drops,
            processing_failures: dispatch.processing_failures,
            forward_failures: dispatch.forward_failures,
            store_failures: sink.failures,
            dispatchers: reports.len(),
            latency_ms: merged_latency(&reports).summary(),
            inbound_high_water: inbound_metrics.high_water,
            outbound_high_water: outbound_metrics.high_water,
            duration: started.elapsed(),
        };

        info!(
            state = ?report.state,
            submitted = report.submitted,
            committed = report.committed,
            lost = report.lost(),
            duration_secs = report.duration.as_secs_f64(),
            "Pipeline stopped"
        );

        report
    }
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("state", &self.state())
            .field("dispatchers", &self.dispatchers.len())
            .field("store", &self.store_name)
            .finish()
    }
}
