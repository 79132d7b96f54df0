//! Pipeline run statistics.

use std::time::Duration;

use observability::PipelineStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Total wall-clock duration of the run
    pub duration: Duration,

    /// Aggregated pipeline counters
    pub pipeline: PipelineStats,
}

impl RunStats {
    /// Messages dispatched per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.pipeline.dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n{}", self.pipeline);
        println!(
            "Duration: {:.2}s ({:.1} msg/s)",
            self.duration.as_secs_f64(),
            self.throughput()
        );
    }
}
