//! 配置校验模块
//!
//! 校验规则：
//! - sink name 非空且唯一
//! - 有界队列 capacity >= 1
//! - tcp sink 必须有合法 addr 参数
//! - framing 参数取值合法

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, PipelineBlueprint, SinkType};

/// 校验 PipelineBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_queue(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_params(blueprint)?;
    Ok(())
}

/// 校验队列容量
fn validate_queue(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.queue.capacity == Some(0) {
        return Err(ContractError::config_validation(
            "queue.capacity",
            "bounded capacity must be >= 1 (omit for unbounded)",
        ));
    }
    Ok(())
}

/// 校验 sink name 非空且唯一
fn validate_sink_names(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验类型特定参数
fn validate_sink_params(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    for sink in &blueprint.sinks {
        if let Some(framing) = sink.params.get("framing") {
            if framing != "newline" && framing != "none" {
                return Err(ContractError::config_validation(
                    format!("sinks[name={}].params.framing", sink.name),
                    format!("unknown framing '{framing}' (expected 'newline' or 'none')"),
                ));
            }
        }

        if sink.sink_type == SinkType::Tcp {
            let addr = sink.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(
                    format!("sinks[name={}].params.addr", sink.name),
                    "tcp sink requires an 'addr' parameter",
                )
            })?;

            addr.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(
                    format!("sinks[name={}].params.addr", sink.name),
                    format!("invalid address '{addr}': {e}"),
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{QueueConfig, SinkConfig};
    use std::collections::HashMap;

    fn console_sink(name: &str) -> SinkConfig {
        SinkConfig {
            name: name.to_string(),
            sink_type: SinkType::Console,
            params: HashMap::new(),
        }
    }

    fn tcp_sink(name: &str, addr: Option<&str>) -> SinkConfig {
        let mut params = HashMap::new();
        if let Some(addr) = addr {
            params.insert("addr".to_string(), addr.to_string());
        }
        SinkConfig {
            name: name.to_string(),
            sink_type: SinkType::Tcp,
            params,
        }
    }

    fn blueprint(queue: QueueConfig, sinks: Vec<SinkConfig>) -> PipelineBlueprint {
        PipelineBlueprint {
            version: Default::default(),
            queue,
            sinks,
        }
    }

    #[test]
    fn test_valid_blueprint_passes() {
        let bp = blueprint(
            QueueConfig::default(),
            vec![
                console_sink("console_main"),
                tcp_sink("tcp_remote", Some("127.0.0.1:9500")),
            ],
        );
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let bp = blueprint(
            QueueConfig {
                capacity: Some(0),
                ..Default::default()
            },
            vec![console_sink("console_main")],
        );
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("queue.capacity"));
    }

    #[test]
    fn test_duplicate_sink_name_rejected() {
        let bp = blueprint(
            QueueConfig::default(),
            vec![console_sink("dup"), console_sink("dup")],
        );
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_tcp_sink_without_addr_rejected() {
        let bp = blueprint(QueueConfig::default(), vec![tcp_sink("tcp_remote", None)]);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("addr"));
    }

    #[test]
    fn test_tcp_sink_with_bad_addr_rejected() {
        let bp = blueprint(
            QueueConfig::default(),
            vec![tcp_sink("tcp_remote", Some("not-an-address"))],
        );
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_unknown_framing_rejected() {
        let mut sink = tcp_sink("tcp_remote", Some("127.0.0.1:9500"));
        sink.params
            .insert("framing".to_string(), "csv".to_string());
        let bp = blueprint(QueueConfig::default(), vec![sink]);
        assert!(validate(&bp).is_err());
    }
}
