//! BoundedQueue - FIFO handoff between pipeline stages
//!
//! One `parking_lot::Mutex` region per operation guards the item sequence.
//! Waiting happens outside the lock on two `Notify`s (`not_empty` for
//! consumers, `not_full` for producers). Every waiter registers interest
//! before inspecting state, so a notification sent between the check and the
//! await is never lost.

use std::collections::VecDeque;

use contracts::{BackpressurePolicy, QueueConfig};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::error::{EnqueueError, TryDequeueError};
use crate::metrics::QueueMetrics;

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Thread-safe FIFO queue with optional capacity.
///
/// Share it between tasks with `Arc<BoundedQueue<T>>`. Items come out in
/// exactly the order they went in; an item is handed to exactly one consumer.
pub struct BoundedQueue<T> {
    name: String,
    capacity: Option<usize>,
    backpressure: BackpressurePolicy,
    state: Mutex<QueueState<T>>,
    not_empty: Notify,
    not_full: Notify,
    metrics: QueueMetrics,
}

impl<T> BoundedQueue<T> {
    /// Create a queue from configuration
    ///
    /// A zero capacity is raised to 1, a queue that can never hold an item
    /// would block its producers forever.
    pub fn new(name: impl Into<String>, config: QueueConfig) -> Self {
        let capacity = config.capacity.map(|cap| cap.max(1));
        let initial = capacity.unwrap_or(0).min(1024);

        Self {
            name: name.into(),
            capacity,
            backpressure: config.backpressure,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(initial),
                closed: false,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            metrics: QueueMetrics::new(),
        }
    }

    /// Create a bounded queue
    pub fn bounded(
        name: impl Into<String>,
        capacity: usize,
        backpressure: BackpressurePolicy,
    ) -> Self {
        Self::new(name, QueueConfig::bounded(capacity, backpressure))
    }

    /// Create an unbounded queue
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, QueueConfig::unbounded())
    }

    /// Queue name (used for logging/metrics)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured capacity (None = unbounded)
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Policy applied by `enqueue` when full
    pub fn backpressure(&self) -> BackpressurePolicy {
        self.backpressure
    }

    /// Queue counters
    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }

    /// Current depth. Snapshot only, may be stale on return.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Snapshot for polling loops, may be stale on return
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Append an item, applying the configured backpressure policy
    ///
    /// - `Block`: suspends while the queue is full
    /// - `Reject`: fails with `EnqueueError::Full` immediately
    ///
    /// # Errors
    /// `Full` (reject policy only) or `Closed`; the item is handed back.
    pub async fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        match self.backpressure {
            BackpressurePolicy::Reject => self.try_enqueue(item),
            BackpressurePolicy::Block => self.enqueue_waiting(item).await,
        }
    }

    /// Append an item without suspending, whatever the configured policy
    ///
    /// A rejected item leaves the queue untouched.
    pub fn try_enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        match self.push(item) {
            Err(EnqueueError::Full(item)) => {
                self.metrics.record_rejected();
                trace!(queue = %self.name, "queue full, item rejected");
                Err(EnqueueError::Full(item))
            }
            other => other,
        }
    }

    async fn enqueue_waiting(&self, mut item: T) -> Result<(), EnqueueError<T>> {
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.push(item) {
                Err(EnqueueError::Full(back)) => item = back,
                other => return other,
            }

            trace!(queue = %self.name, "queue full, producer waiting");
            notified.await;
        }
    }

    /// Remove the head, suspending while the queue is empty
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<T> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.pop() {
                Ok(item) => return Some(item),
                Err(TryDequeueError::Closed) => return None,
                Err(TryDequeueError::Empty) => {}
            }

            notified.await;
        }
    }

    /// Remove the head without suspending
    ///
    /// # Errors
    /// `Empty` if nothing is queued right now, `Closed` if nothing ever will be.
    pub fn try_dequeue(&self) -> Result<T, TryDequeueError> {
        self.pop()
    }

    /// Stop accepting items and wake every waiter
    ///
    /// Queued items stay available to consumers. Returns false if the queue
    /// was already closed.
    pub fn close(&self) -> bool {
        let remaining = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.items.len()
        };

        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
        debug!(queue = %self.name, remaining, "queue closed");
        true
    }

    fn push(&self, item: T) -> Result<(), EnqueueError<T>> {
        let depth = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(EnqueueError::Closed(item));
            }
            if self.capacity.is_some_and(|cap| state.items.len() >= cap) {
                return Err(EnqueueError::Full(item));
            }
            state.items.push_back(item);
            state.items.len()
        };

        self.metrics.record_enqueue(depth);
        self.not_empty.notify_one();
        Ok(())
    }

    fn pop(&self) -> Result<T, TryDequeueError> {
        let item = {
            let mut state = self.state.lock();
            match state.items.pop_front() {
                Some(item) => item,
                None if state.closed => return Err(TryDequeueError::Closed),
                None => return Err(TryDequeueError::Empty),
            }
        };

        self.metrics.record_dequeue();
        self.not_full.notify_one();
        Ok(item)
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedQueue")
            .field("name", &self.name)
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("backpressure", &self.backpressure)
            .field("closed", &state.closed)
            .finish()
    }
}
