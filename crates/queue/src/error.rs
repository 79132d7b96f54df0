//! Queue error types

use thiserror::Error;

/// Queue-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Queue was closed; no further messages are accepted
    #[error("queue is closed")]
    Closed,
}
