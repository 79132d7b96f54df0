//! 管道指标收集模块
//!
//! 基于队列与分发计数记录运行指标。

use metrics::{counter, gauge};

/// 记录一次成功入队
pub fn record_message_enqueued() {
    counter!("logfan_messages_enqueued_total").increment(1);
}

/// 记录一次 Reject 策略丢弃
pub fn record_message_rejected() {
    counter!("logfan_messages_rejected_total").increment(1);
}

/// 记录一次 EvictOldest 策略置换
pub fn record_message_evicted() {
    counter!("logfan_messages_evicted_total").increment(1);
}

/// 记录当前队列深度
pub fn record_queue_depth(depth: usize) {
    gauge!("logfan_queue_depth").set(depth as f64);
}

/// 记录一次投递结果
pub fn record_delivery(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "logfan_deliveries_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 单个 sink 的运行统计
#[derive(Debug, Clone, Default)]
pub struct SinkStats {
    /// Sink 名称
    pub name: String,

    /// 成功投递数
    pub delivered: u64,

    /// 失败投递数
    pub failed: u64,
}

/// 管道运行摘要
///
/// 在内存中聚合计数，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// 成功入队总数
    pub enqueued: u64,

    /// Reject 丢弃总数
    pub rejected: u64,

    /// EvictOldest 置换总数
    pub evicted: u64,

    /// 完成 fan-out 的消息总数
    pub dispatched: u64,

    /// 各 sink 统计
    pub sinks: Vec<SinkStats>,
}

impl PipelineStats {
    /// 丢弃率 (rejected + evicted, 相对 enqueue 尝试数)
    pub fn discard_rate(&self) -> f64 {
        let attempts = self.enqueued + self.rejected;
        if attempts == 0 {
            0.0
        } else {
            (self.rejected + self.evicted) as f64 / attempts as f64 * 100.0
        }
    }

    /// 失败投递总数
    pub fn total_failures(&self) -> u64 {
        self.sinks.iter().map(|s| s.failed).sum()
    }
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pipeline Summary ===")?;
        writeln!(f, "Enqueued: {}", self.enqueued)?;
        writeln!(
            f,
            "Discarded: {} rejected, {} evicted ({:.2}%)",
            self.rejected,
            self.evicted,
            self.discard_rate()
        )?;
        writeln!(f, "Dispatched: {}", self.dispatched)?;

        for sink in &self.sinks {
            writeln!(
                f,
                "  {}: {} delivered, {} failed",
                sink.name, sink.delivered, sink.failed
            )?;
        }

        Ok(())
    }
}
