//! Sink counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Batches where the sink accepted at least one record
    send_count: AtomicU64,
    /// Batches the sink rejected entirely
    failure_count: AtomicU64,
    /// Total records the sink asserted were accepted
    records_accepted: AtomicU64,
}

impl SinkMetrics {
    /// Create new counters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::Relaxed)
    }

    pub fn inc_send_count(&self) {
        self.send_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_accepted(&self) -> u64 {
        self.records_accepted.load(Ordering::Relaxed)
    }

    pub fn add_records_accepted(&self, count: u64) {
        self.records_accepted.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            send_count: self.send_count(),
            failure_count: self.failure_count(),
            records_accepted: self.records_accepted(),
        }
    }
}

/// Snapshot of sink counters (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub send_count: u64,
    pub failure_count: u64,
    pub records_accepted: u64,
}
