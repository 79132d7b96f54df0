//! Layered error definitions
//!
//! Categorized by source: config / sink / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink connection error (one-time setup failed)
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    /// Sink called before successful initialization or after teardown
    #[error("sink '{sink_name}' is not ready")]
    SinkNotReady { sink_name: String },

    /// Sink transport error (mid-send failure)
    #[error("sink '{sink_name}' transport error: {message}")]
    SinkTransport { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink not-ready error
    pub fn sink_not_ready(sink_name: impl Into<String>) -> Self {
        Self::SinkNotReady {
            sink_name: sink_name.into(),
        }
    }

    /// Create sink transport error
    pub fn sink_transport(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkTransport {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error distinguishes an uninitialized/torn-down sink
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::SinkNotReady { .. })
    }
}
