//! Queue metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for a single queue
#[derive(Debug, Default)]
pub struct QueueMetrics {
    /// Current buffer depth
    depth: AtomicUsize,
    /// Total messages accepted into the buffer
    enqueued_count: AtomicU64,
    /// Total new messages discarded under the Reject policy
    rejected_count: AtomicU64,
    /// Total oldest messages displaced under the EvictOldest policy
    evicted_count: AtomicU64,
}

impl QueueMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current buffer depth
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Set current buffer depth
    pub fn set_depth(&self, depth: usize) {
        self.depth.store(depth, Ordering::Relaxed);
    }

    /// Get total enqueued count
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued_count.load(Ordering::Relaxed)
    }

    /// Increment enqueued count
    pub fn inc_enqueued_count(&self) {
        self.enqueued_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rejected count
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    /// Increment rejected count
    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get evicted count
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count.load(Ordering::Relaxed)
    }

    /// Increment evicted count
    pub fn inc_evicted_count(&self) {
        self.evicted_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            depth: self.depth(),
            enqueued_count: self.enqueued_count(),
            rejected_count: self.rejected_count(),
            evicted_count: self.evicted_count(),
        }
    }
}

/// Snapshot of queue metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueMetricsSnapshot {
    pub depth: usize,
    pub enqueued_count: u64,
    pub rejected_count: u64,
    pub evicted_count: u64,
}
