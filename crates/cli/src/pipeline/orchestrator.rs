//! Pipeline orchestrator - coordinates producers, queue and dispatcher.
//!
//! The hosting side of the pipeline: reads event messages from stdin,
//! enqueues them, and lets the dispatcher fan them out to configured sinks.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use dispatcher::create_dispatcher;
use observability::{
    record_delivery, record_message_enqueued, record_message_evicted, record_message_rejected,
    record_queue_depth, SinkStats,
};
use queue::{EnqueueOutcome, EventQueue};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::stats::RunStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint configuration
    pub blueprint: PipelineBlueprint,

    /// Maximum number of messages to process (None = unlimited)
    pub max_messages: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Terminates on stdin EOF, the message limit, or a shutdown signal; in
    /// every case the queue is closed and buffered messages are drained
    /// before statistics are reported.
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!(port = port, "Metrics endpoint available");
        }

        // Build queue and dispatcher from the blueprint
        let queue = EventQueue::new(blueprint.queue);
        let dispatcher = create_dispatcher(&blueprint.sinks, queue.clone())
            .await
            .context("Failed to register configured sinks")?;

        // Drain delivery failure reports out-of-band
        let mut failures = dispatcher.failure_reports();
        let failure_drain = tokio::spawn(async move {
            while let Some(report) = failures.recv().await {
                record_delivery(&report.sink_name, false);
                warn!(
                    sink = %report.sink_name,
                    error = %report.error,
                    "delivery failure reported"
                );
            }
        });

        let drain = dispatcher.spawn();

        info!(
            sinks = dispatcher.sink_count().await,
            "Pipeline started, reading messages from stdin"
        );

        tokio::select! {
            result = pump_stdin(&queue, self.config.max_messages) => {
                result?;
                info!("Input exhausted, draining queue");
            }
            _ = shutdown_signal() => {
                warn!("Received shutdown signal, draining queue");
            }
        }

        // Drain-then-stop: buffered messages still reach every sink
        queue.close();
        drain.await.context("Dispatcher task panicked")?;
        failure_drain
            .await
            .context("Failure drain task panicked")?;

        // Assemble run statistics from queue and per-sink counters
        let queue_snapshot = queue.metrics().snapshot();
        let pipeline = observability::PipelineStats {
            enqueued: queue_snapshot.enqueued_count,
            rejected: queue_snapshot.rejected_count,
            evicted: queue_snapshot.evicted_count,
            dispatched: dispatcher.dispatched_count(),
            sinks: dispatcher
                .sink_metrics()
                .await
                .into_iter()
                .map(|(name, m)| SinkStats {
                    name,
                    delivered: m.delivered_count,
                    failed: m.failure_count,
                })
                .collect(),
        };

        Ok(RunStats {
            duration: start_time.elapsed(),
            pipeline,
        })
    }
}

/// Read lines from stdin and enqueue them as messages
async fn pump_stdin(queue: &EventQueue, max_messages: Option<u64>) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut produced = 0u64;

    while let Some(line) = lines.next_line().await? {
        match queue.enqueue(line).await {
            Ok(EnqueueOutcome::Enqueued) => record_message_enqueued(),
            Ok(EnqueueOutcome::Rejected) => record_message_rejected(),
            Ok(EnqueueOutcome::Evicted) => {
                record_message_enqueued();
                record_message_evicted();
            }
            // Queue closed from elsewhere; stop producing
            Err(_) => break,
        }
        record_queue_depth(queue.len());

        produced += 1;
        if max_messages.is_some_and(|max| produced >= max) {
            info!(messages = produced, "Reached message limit");
            break;
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
