//! # Queue
//!
//! 消息缓冲模块。
//!
//! 负责：
//! - 有界/无界消息缓冲，FIFO 顺序
//! - 溢出策略 (Wait / Reject / EvictOldest)
//! - 生产者与分发器之间的唯一同步边界

pub mod error;
pub mod metrics;
pub mod queue;

pub use contracts::{Message, OverflowPolicy, QueueConfig};
pub use error::QueueError;
pub use metrics::{QueueMetrics, QueueMetricsSnapshot};
pub use queue::{EnqueueOutcome, EventQueue};
