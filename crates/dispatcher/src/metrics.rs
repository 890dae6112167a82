//! Dispatcher metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every dispatcher task draining the same queue pair
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Items pulled from the inbound queue
    dequeued: AtomicU64,
    /// Items a worker processed successfully
    processed: AtomicU64,
    /// Results accepted by the outbound queue
    forwarded: AtomicU64,
    /// Items dropped because the pool was empty
    no_worker_drops: AtomicU64,
    /// Items whose worker returned an error
    processing_failures: AtomicU64,
    /// Results the outbound queue refused
    forward_failures: AtomicU64,
}

impl DispatcherMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub fn inc_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn inc_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn no_worker_drops(&self) -> u64 {
        self.no_worker_drops.load(Ordering::Relaxed)
    }

    pub fn inc_no_worker_drops(&self) {
        self.no_worker_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processing_failures(&self) -> u64 {
        self.processing_failures.load(Ordering::Relaxed)
    }

    pub fn inc_processing_failures(&self) {
        self.processing_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn forward_failures(&self) -> u64 {
        self.forward_failures.load(Ordering::Relaxed)
    }

    pub fn inc_forward_failures(&self) {
        self.forward_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> DispatcherMetricsSnapshot {
        DispatcherMetricsSnapshot {
            dequeued: self.dequeued(),
            processed: self.processed(),
            forwarded: self.forwarded(),
            no_worker_drops: self.no_worker_drops(),
            processing_failures: self.processing_failures(),
            forward_failures: self.forward_failures(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherMetricsSnapshot {
    pub dequeued: u64,
    pub processed: u64,
    pub forwarded: u64,
    pub no_worker_drops: u64,
    pub processing_failures: u64,
    pub forward_failures: u64,
}

impl DispatcherMetricsSnapshot {
    /// Items dropped for any reason
    pub fn dropped(&self) -> u64 {
        self.no_worker_drops + self.processing_failures + self.forward_failures
    }
}
