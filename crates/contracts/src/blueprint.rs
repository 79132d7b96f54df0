//! PipelineBlueprint - Config Loader 输出
//!
//! 描述完整的管道配置：队列容量、溢出策略、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的管道配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 消息队列配置
    #[serde(default)]
    pub queue: QueueConfig,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 消息队列配置
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    /// 缓冲容量 (None = 无界)
    #[serde(default)]
    pub capacity: Option<usize>,

    /// 溢出策略 (有界且满时)
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl QueueConfig {
    /// Unbounded queue, overflow policy never consulted
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            overflow: OverflowPolicy::default(),
        }
    }

    /// Bounded queue with the given capacity and policy
    pub fn bounded(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            capacity: Some(capacity),
            overflow,
        }
    }
}

/// 溢出策略 (有界队列满时)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// 挂起生产者直到有空位
    #[default]
    Wait,
    /// 丢弃新消息
    Reject,
    /// 丢弃最旧的消息
    EvictOldest,
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 控制台输出
    Console,
    /// 网络输出 (TCP)
    Tcp,
}
