//! Pipeline metrics for observability
//!
//! Counters for monitoring the producer/consumer pipeline, particularly the
//! drop paths: enqueueing against a stopped writer and destination write
//! failures.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one writer's task pipeline.
///
/// # Example
///
/// ```
/// use task_logger_system::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_executed();
/// assert_eq!(metrics.tasks_enqueued(), 1);
/// assert_eq!(metrics.tasks_executed(), 1);
/// assert_eq!(metrics.tasks_dropped(), 0);
/// ```
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Tasks successfully handed to the writer's queue
    tasks_enqueued: AtomicU64,

    /// Tasks executed against the destination
    tasks_executed: AtomicU64,

    /// Tasks lost: enqueue after stop, write failure, or forced-stop discard
    tasks_dropped: AtomicU64,
}

impl PipelineMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            tasks_enqueued: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn tasks_enqueued(&self) -> u64 {
        self.tasks_enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn tasks_executed(&self) -> u64 {
        self.tasks_executed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn tasks_dropped(&self) -> u64 {
        self.tasks_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.tasks_enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_executed(&self) -> u64 {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.tasks_dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.tasks_enqueued.store(0, Ordering::Relaxed);
        self.tasks_executed.store(0, Ordering::Relaxed);
        self.tasks_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
