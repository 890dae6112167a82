//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::StatsSummary;

use crate::PipelineState;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// State when the report was taken
    pub state: PipelineState,

    /// Items accepted by the inbound queue
    pub submitted: u64,

    /// Submissions refused because the inbound queue was full
    pub rejected: u64,

    /// Items a worker processed successfully
    pub processed: u64,

    /// Results the store accepted
    pub committed: u64,

    /// Items dropped because the pool was empty
    pub no_worker_drops: u64,

    /// Items whose worker failed
    pub processing_failures: u64,

    /// Results the outbound queue refused
    pub forward_failures: u64,

    /// Results the store failed to commit
    pub store_failures: u64,

    /// Number of dispatcher tasks
    pub dispatchers: usize,

    /// Worker processing time (ms) across all dispatchers
    pub latency_ms: StatsSummary,

    /// Largest observed inbound / outbound depth
    pub inbound_high_water: usize,
    pub outbound_high_water: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineReport {
    /// Accepted items that never reached the store
    pub fn lost(&self) -> u64 {
        self.submitted.saturating_sub(self.committed)
    }

    /// Items dropped inside the dispatch stage
    pub fn dropped(&self) -> u64 {
        self.no_worker_drops + self.processing_failures + self.forward_failures
    }

    /// Every accepted item is either committed or counted as a failure
    pub fn is_balanced(&self) -> bool {
        self.committed + self.dropped() + self.store_failures == self.submitted
    }

    /// Committed results per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.committed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Loss as percentage of submitted items
    pub fn loss_rate(&self) -> f64 {
        if self.submitted > 0 {
            (self.lost() as f64 / self.submitted as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ State: {:?}", self.state);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Dispatchers: {}", self.dispatchers);
        println!("   ├─ Submitted: {}", self.submitted);
        println!("   ├─ Processed: {}", self.processed);
        println!("   ├─ Committed: {}", self.committed);
        println!("   └─ Throughput: {:.2} results/s", self.throughput());

        println!("\n📉 Losses");
        println!("   ├─ Rejected on submit: {}", self.rejected);
        println!("   ├─ No worker available: {}", self.no_worker_drops);
        println!("   ├─ Processing failures: {}", self.processing_failures);
        println!("   ├─ Forward failures: {}", self.forward_failures);
        println!("   ├─ Store failures: {}", self.store_failures);
        println!("   └─ Lost: {} ({:.2}%)", self.lost(), self.loss_rate());

        println!("\n📈 Queues & Latency");
        println!("   ├─ Inbound high water: {}", self.inbound_high_water);
        println!("   ├─ Outbound high water: {}", self.outbound_high_water);
        println!("   └─ Processing latency (ms): {}", self.latency_ms);

        println!();
    }
}
