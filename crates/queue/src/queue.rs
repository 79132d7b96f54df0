//! EventQueue - overflow-aware FIFO buffer between producers and the dispatcher

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Message, OverflowPolicy, QueueConfig};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::error::QueueError;
use crate::metrics::QueueMetrics;

/// Result of an enqueue attempt
///
/// Rejection and eviction are outcomes, not errors: the queue stays healthy
/// and the discard is observable through [`QueueMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Message accepted into the buffer
    Enqueued,
    /// Buffer full under the Reject policy; the new message was discarded
    Rejected,
    /// Message accepted; the oldest pending message was displaced
    Evicted,
}

/// Overflow-aware message queue
///
/// Cloning yields another handle to the same buffer: producers keep clones
/// for `enqueue`, the dispatcher keeps one for `dequeue`. The internal mutex
/// plus notify pair is the sole synchronization boundary between them.
#[derive(Clone)]
pub struct EventQueue {
    shared: Arc<Shared>,
}

struct Shared {
    capacity: Option<usize>,
    policy: OverflowPolicy,
    state: Mutex<QueueState>,
    /// Signaled when a message becomes available or the queue closes
    readable: Notify,
    /// Signaled when a slot frees (consulted by Wait-policy producers)
    writable: Notify,
    metrics: Arc<QueueMetrics>,
}

struct QueueState {
    buf: VecDeque<Message>,
    closed: bool,
}

impl EventQueue {
    /// Create a queue from configuration
    pub fn new(config: QueueConfig) -> Self {
        let buf = match config.capacity {
            Some(capacity) => VecDeque::with_capacity(capacity),
            None => VecDeque::new(),
        };

        Self {
            shared: Arc::new(Shared {
                capacity: config.capacity,
                policy: config.overflow,
                state: Mutex::new(QueueState { buf, closed: false }),
                readable: Notify::new(),
                writable: Notify::new(),
                metrics: Arc::new(QueueMetrics::new()),
            }),
        }
    }

    /// Create an unbounded queue
    pub fn unbounded() -> Self {
        Self::new(QueueConfig::unbounded())
    }

    /// Create a bounded queue with the given capacity and overflow policy
    pub fn bounded(capacity: usize, policy: OverflowPolicy) -> Self {
        Self::new(QueueConfig::bounded(capacity, policy))
    }

    /// Buffer capacity (`None` = unbounded)
    pub fn capacity(&self) -> Option<usize> {
        self.shared.capacity
    }

    /// Overflow policy (consulted only when bounded)
    pub fn policy(&self) -> OverflowPolicy {
        self.shared.policy
    }

    /// Number of messages currently buffered
    pub fn len(&self) -> usize {
        self.lock_state().buf.len()
    }

    /// Whether the buffer is currently empty
    pub fn is_empty(&self) -> bool {
        self.lock_state().buf.is_empty()
    }

    /// Whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Queue counters
    pub fn metrics(&self) -> &Arc<QueueMetrics> {
        &self.shared.metrics
    }

    /// Append a message, applying the overflow policy when bounded and full
    ///
    /// Suspends only under the Wait policy; Reject and EvictOldest resolve
    /// immediately. Closing the queue releases a suspended producer with
    /// `QueueError::Closed`.
    pub async fn enqueue(
        &self,
        message: impl Into<Message>,
    ) -> Result<EnqueueOutcome, QueueError> {
        let message = message.into();

        loop {
            let notified = self.shared.writable.notified();
            tokio::pin!(notified);

            {
                let mut state = self.lock_state();
                if state.closed {
                    return Err(QueueError::Closed);
                }

                let full = self
                    .shared
                    .capacity
                    .is_some_and(|cap| state.buf.len() >= cap);

                if !full {
                    return Ok(self.push(&mut state, message));
                }

                match self.shared.policy {
                    OverflowPolicy::Wait => {
                        // Register interest while holding the lock so a slot
                        // freed (or a close) between unlock and await still
                        // wakes this producer.
                        notified.as_mut().enable();
                    }
                    OverflowPolicy::Reject => {
                        self.shared.metrics.inc_rejected_count();
                        warn!(
                            capacity = ?self.shared.capacity,
                            payload_len = message.len(),
                            "queue full, message rejected"
                        );
                        return Ok(EnqueueOutcome::Rejected);
                    }
                    OverflowPolicy::EvictOldest => {
                        state.buf.pop_front();
                        self.shared.metrics.inc_evicted_count();
                        debug!(
                            capacity = ?self.shared.capacity,
                            "queue full, oldest message evicted"
                        );
                        let _ = self.push(&mut state, message);
                        return Ok(EnqueueOutcome::Evicted);
                    }
                }
            }

            notified.await;
        }
    }

    /// Remove and return the next message in FIFO order
    ///
    /// Suspends while the buffer is empty and the queue is open. Returns
    /// `None` once the queue is closed and fully drained (end-of-stream).
    pub async fn dequeue(&self) -> Option<Message> {
        loop {
            let notified = self.shared.readable.notified();
            tokio::pin!(notified);

            {
                let mut state = self.lock_state();
                if let Some(message) = state.buf.pop_front() {
                    self.shared.metrics.set_depth(state.buf.len());
                    self.shared.writable.notify_one();
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
                notified.as_mut().enable();
            }

            notified.await;
        }
    }

    /// Close the queue
    ///
    /// Idempotent. Buffered messages remain dequeueable; suspended producers
    /// and consumers are released.
    pub fn close(&self) {
        {
            let mut state = self.lock_state();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        debug!("queue closed");
        self.shared.readable.notify_waiters();
        self.shared.writable.notify_waiters();
    }

    fn push(&self, state: &mut MutexGuard<'_, QueueState>, message: Message) -> EnqueueOutcome {
        state.buf.push_back(message);
        self.shared.metrics.inc_enqueued_count();
        self.shared.metrics.set_depth(state.buf.len());
        self.shared.readable.notify_one();
        EnqueueOutcome::Enqueued
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // A panicked holder leaves the buffer structurally intact
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("EventQueue")
            .field("len", &state.buf.len())
            .field("capacity", &self.shared.capacity)
            .field("policy", &self.shared.policy)
            .field("closed", &state.closed)
            .finish()
    }
}
