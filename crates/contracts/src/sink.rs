//! EventSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for sinks. Object-safe so the dispatcher
//! can hold a heterogeneous registered set behind `Box<dyn EventSink>`.

use async_trait::async_trait;

use crate::{ContractError, Message};

/// Delivery destination trait
///
/// All sink implementations must implement this trait. Sinks are not
/// required to buffer, retry, or reconnect internally; that policy, if
/// desired, belongs to the concrete sink, not the dispatcher.
#[async_trait]
pub trait EventSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// One-time setup (e.g. opening a connection)
    ///
    /// # Errors
    /// Returns a connection-kind error if setup cannot complete
    async fn initialize(&mut self) -> Result<(), ContractError>;

    /// Send one message to the destination
    ///
    /// # Errors
    /// Returns `SinkNotReady` if called before successful initialization or
    /// after teardown, `SinkTransport` on a mid-send failure
    async fn deliver(&mut self, message: &Message) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
