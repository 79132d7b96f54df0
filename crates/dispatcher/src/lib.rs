//! # Dispatcher
//!
//! 消息分发模块。
//!
//! 负责：
//! - 从队列消费 `Message`
//! - Fan-out 到多个 sinks（逐条消息并发投递）
//! - 隔离失败 sink，不中断排水循环

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod report;
pub mod sinks;

pub use contracts::{EventSink, Message};
pub use dispatcher::{create_dispatcher, Dispatcher};
pub use error::DispatcherError;
pub use metrics::{SinkMetrics, SinkMetricsSnapshot};
pub use report::DeliveryFailure;
pub use sinks::{ConsoleSink, TcpSink};
