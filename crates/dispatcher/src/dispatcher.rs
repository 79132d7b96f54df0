//! Dispatcher - drain loop with per-message fan-out to sinks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use contracts::{EventSink, Message, SinkConfig, SinkType};
use queue::EventQueue;

use crate::error::DispatcherError;
use crate::metrics::{SinkMetrics, SinkMetricsSnapshot};
use crate::report::DeliveryFailure;
use crate::sinks::{ConsoleSink, TcpSink};

/// A sink published to the active set
struct SinkEntry {
    name: String,
    sink: Box<dyn EventSink>,
    metrics: Arc<SinkMetrics>,
}

impl SinkEntry {
    async fn deliver(&mut self, message: &Message) -> Option<DeliveryFailure> {
        match self.sink.deliver(message).await {
            Ok(()) => {
                self.metrics.inc_delivered_count();
                None
            }
            Err(err) => {
                self.metrics.inc_failure_count();
                error!(sink = %self.name, error = %err, "delivery failed");
                Some(DeliveryFailure {
                    sink_name: self.name.clone(),
                    message: message.clone(),
                    error: err,
                })
            }
        }
    }
}

/// The Dispatcher that fans messages out to sinks
///
/// Cloning yields another handle to the same dispatcher, so a hosting
/// application can register sinks while the drain loop is running. A sink
/// registered mid-stream takes effect from the next message pulled after
/// registration completes.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    queue: EventQueue,
    /// Active sink set; locked once per message cycle by the drain loop,
    /// so registration serializes with cycle boundaries
    sinks: Mutex<Vec<SinkEntry>>,
    failure_tx: std::sync::Mutex<Option<mpsc::UnboundedSender<DeliveryFailure>>>,
    dispatched_count: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher draining the given queue, with no sinks registered
    pub fn new(queue: EventQueue) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue,
                sinks: Mutex::new(Vec::new()),
                failure_tx: std::sync::Mutex::new(None),
                dispatched_count: AtomicU64::new(0),
            }),
        }
    }

    /// Initialize a sink and publish it to the active set
    ///
    /// The sink's `initialize()` runs to completion first; only on success
    /// does the sink become visible to the drain loop. An initialization
    /// failure is returned to the caller and the active set is unchanged.
    #[instrument(name = "dispatcher_register_sink", skip(self, sink), fields(sink = %sink.name()))]
    pub async fn register_sink(&self, mut sink: Box<dyn EventSink>) -> Result<(), DispatcherError> {
        let name = sink.name().to_string();

        sink.initialize()
            .await
            .map_err(|source| DispatcherError::SinkInit {
                name: name.clone(),
                source,
            })?;

        let mut sinks = self.inner.sinks.lock().await;
        sinks.push(SinkEntry {
            name: name.clone(),
            sink,
            metrics: Arc::new(SinkMetrics::new()),
        });
        info!(sink = %name, active = sinks.len(), "sink registered");
        Ok(())
    }

    /// Construct a sink from configuration, then register it
    #[instrument(
        name = "dispatcher_register_from_config",
        skip(self, config),
        fields(sink = %config.name, sink_type = ?config.sink_type)
    )]
    pub async fn register_from_config(&self, config: &SinkConfig) -> Result<(), DispatcherError> {
        let sink = create_sink(config)?;
        self.register_sink(sink).await
    }

    /// Obtain the out-of-band failure report channel
    ///
    /// Each failed (message, sink) delivery produces one report. Calling
    /// this again replaces the previous receiver.
    pub fn failure_reports(&self) -> mpsc::UnboundedReceiver<DeliveryFailure> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.lock_failure_tx() = Some(tx);
        rx
    }

    /// Number of sinks in the active set
    pub async fn sink_count(&self) -> usize {
        self.inner.sinks.lock().await.len()
    }

    /// Per-sink delivery counters, in registration order
    pub async fn sink_metrics(&self) -> Vec<(String, SinkMetricsSnapshot)> {
        self.inner
            .sinks
            .lock()
            .await
            .iter()
            .map(|entry| (entry.name.clone(), entry.metrics.snapshot()))
            .collect()
    }

    /// Total messages pulled and fanned out
    pub fn dispatched_count(&self) -> u64 {
        self.inner.dispatched_count.load(Ordering::Relaxed)
    }

    /// Run the dispatcher drain loop
    ///
    /// Pulls one message at a time and delivers it to every registered sink
    /// concurrently, waiting for all deliveries before the next pull. A
    /// failure at one sink aborts neither its siblings nor the loop.
    /// Returns when the queue reports closed-and-drained, after flushing
    /// and closing every sink.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(&self) {
        info!("dispatcher started");

        while let Some(message) = self.inner.queue.dequeue().await {
            let count = self.inner.dispatched_count.fetch_add(1, Ordering::Relaxed) + 1;
            self.dispatch_message(&message).await;

            if count.is_multiple_of(1000) {
                debug!(messages = count, "dispatcher progress");
            }
        }

        info!(
            messages = self.dispatched_count(),
            "queue closed and drained, shutting down"
        );

        self.close_sinks().await;

        // Drop the failure channel so report consumers observe end-of-stream
        self.lock_failure_tx().take();

        info!("dispatcher shutdown complete");
    }

    /// Spawn the drain loop as a background task
    pub fn spawn(&self) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        })
    }

    /// Close the queue; buffered messages are still drained before `run` returns
    pub fn shutdown(&self) {
        self.inner.queue.close();
    }

    async fn dispatch_message(&self, message: &Message) {
        let mut sinks = self.inner.sinks.lock().await;
        if sinks.is_empty() {
            return;
        }

        // One concurrent delivery per sink; the join is the per-message
        // barrier - the next dequeue happens only after every sink finished
        let outcomes = join_all(
            sinks
                .iter_mut()
                .map(|entry| entry.deliver(message)),
        )
        .await;
        drop(sinks);

        for failure in outcomes.into_iter().flatten() {
            self.report_failure(failure);
        }
    }

    async fn close_sinks(&self) {
        let mut sinks = self.inner.sinks.lock().await;
        for entry in sinks.iter_mut() {
            if let Err(err) = entry.sink.flush().await {
                error!(sink = %entry.name, error = %err, "flush failed on shutdown");
            }
            if let Err(err) = entry.sink.close().await {
                error!(sink = %entry.name, error = %err, "close failed on shutdown");
            }
            debug!(sink = %entry.name, "sink closed");
        }
    }

    fn report_failure(&self, failure: DeliveryFailure) {
        let mut guard = self.lock_failure_tx();
        if let Some(tx) = guard.as_ref() {
            if tx.send(failure).is_err() {
                // Receiver dropped; stop reporting
                *guard = None;
            }
        }
    }

    fn lock_failure_tx(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<DeliveryFailure>>> {
        self.inner
            .failure_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a sink instance from configuration
pub fn create_sink(config: &SinkConfig) -> Result<Box<dyn EventSink>, DispatcherError> {
    match config.sink_type {
        SinkType::Console => Ok(Box::new(ConsoleSink::new(&config.name))),
        SinkType::Tcp => {
            let sink = TcpSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(Box::new(sink))
        }
    }
}

/// Convenience function: build a dispatcher and register all configured sinks
#[instrument(name = "dispatcher_create", skip(sink_configs, queue))]
pub async fn create_dispatcher(
    sink_configs: &[SinkConfig],
    queue: EventQueue,
) -> Result<Dispatcher, DispatcherError> {
    let dispatcher = Dispatcher::new(queue);
    for config in sink_configs {
        dispatcher.register_from_config(config).await?;
    }
    Ok(dispatcher)
}
