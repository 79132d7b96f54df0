//! TcpSink - streams messages over a TCP connection

use std::collections::HashMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use contracts::{ContractError, EventSink, Message};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};

/// Message framing on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Append a trailing newline to each message
    #[default]
    Newline,
    /// Raw payload bytes, no delimiter
    None,
}

/// Configuration for TcpSink
#[derive(Debug, Clone)]
pub struct TcpSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Wire framing
    pub framing: Framing,
}

impl TcpSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let framing = match params.get("framing").map(String::as_str) {
            Some("none") => Framing::None,
            Some("newline") | None => Framing::Newline,
            Some(other) => return Err(format!("unknown framing '{other}'")),
        };

        Ok(Self { addr, framing })
    }
}

/// Sink that sends messages to a remote TCP endpoint
///
/// Connects during `initialize`; a mid-send failure tears the stream down so
/// later deliveries fail not-ready until `initialize` is called again. No
/// automatic reconnection is attempted - that policy stays with the caller.
pub struct TcpSink {
    name: String,
    config: TcpSinkConfig,
    stream: Option<TcpStream>,
}

impl TcpSink {
    /// Create a new TcpSink (not yet connected)
    pub fn new(name: impl Into<String>, config: TcpSinkConfig) -> Self {
        Self {
            name: name.into(),
            config,
            stream: None,
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let config = TcpSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation("sinks.params", e))?;
        Ok(Self::new(name, config))
    }
}

#[async_trait]
impl EventSink for TcpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "tcp_sink_initialize", skip(self), fields(sink = %self.name))]
    async fn initialize(&mut self) -> Result<(), ContractError> {
        let stream = TcpStream::connect(self.config.addr)
            .await
            .map_err(|e| ContractError::sink_connection(&self.name, e.to_string()))?;

        debug!(
            sink = %self.name,
            target = %self.config.addr,
            "tcp sink connected"
        );

        self.stream = Some(stream);
        Ok(())
    }

    #[instrument(
        name = "tcp_sink_deliver",
        skip(self, message),
        fields(sink = %self.name, payload_len = message.len())
    )]
    async fn deliver(&mut self, message: &Message) -> Result<(), ContractError> {
        let framing = self.config.framing;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ContractError::sink_not_ready(&self.name))?;

        let write = async {
            stream.write_all(message.as_bytes()).await?;
            if framing == Framing::Newline {
                stream.write_all(b"\n").await?;
            }
            Ok::<(), std::io::Error>(())
        };

        if let Err(e) = write.await {
            // A torn stream is not reusable; drop it so later deliveries
            // report not-ready until the caller re-initializes
            self.stream = None;
            warn!(sink = %self.name, error = %e, "tcp send failed, stream torn down");
            return Err(ContractError::sink_transport(&self.name, e.to_string()));
        }

        Ok(())
    }

    #[instrument(name = "tcp_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(stream) = self.stream.as_mut() {
            stream
                .flush()
                .await
                .map_err(|e| ContractError::sink_transport(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "tcp_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!(sink = %self.name, "tcp sink closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_tcp_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9500".to_string());
        params.insert("framing".to_string(), "none".to_string());

        let config = TcpSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9500);
        assert_eq!(config.framing, Framing::None);
    }

    #[test]
    fn test_tcp_sink_config_missing_addr() {
        let params = HashMap::new();
        assert!(TcpSinkConfig::from_params(&params).is_err());
    }

    #[test]
    fn test_tcp_sink_config_unknown_framing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9500".to_string());
        params.insert("framing".to_string(), "length_prefix".to_string());
        assert!(TcpSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_tcp_sink_initialize_fails_without_listener() {
        // Port 1 is never bound in the test environment
        let config = TcpSinkConfig {
            addr: "127.0.0.1:1".parse().unwrap(),
            framing: Framing::Newline,
        };

        let mut sink = TcpSink::new("tcp_unreachable", config);
        let err = sink.initialize().await.unwrap_err();
        assert!(matches!(err, ContractError::SinkConnection { .. }));
    }

    #[tokio::test]
    async fn test_tcp_sink_delivery_and_manual_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let mut payloads = Vec::new();
            for _ in 0..2 {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                socket.read_to_end(&mut buf).await.unwrap();
                payloads.push(String::from_utf8(buf).unwrap());
            }
            payloads
        });

        let config = TcpSinkConfig {
            addr,
            framing: Framing::Newline,
        };
        let mut sink = TcpSink::new("tcp_test", config);

        sink.initialize().await.unwrap();
        sink.deliver(&Message::from("alpha")).await.unwrap();
        sink.close().await.unwrap();

        // Torn down: delivery reports not-ready, not a transport error
        let err = sink.deliver(&Message::from("beta")).await.unwrap_err();
        assert!(err.is_not_ready());

        // A second initialize reconnects
        sink.initialize().await.unwrap();
        sink.deliver(&Message::from("gamma")).await.unwrap();
        sink.close().await.unwrap();

        let payloads = server.await.unwrap();
        assert_eq!(payloads, vec!["alpha\n".to_string(), "gamma\n".to_string()]);
    }

    #[tokio::test]
    async fn test_tcp_sink_raw_framing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let config = TcpSinkConfig {
            addr,
            framing: Framing::None,
        };
        let mut sink = TcpSink::new("tcp_raw", config);

        sink.initialize().await.unwrap();
        sink.deliver(&Message::from("raw-bytes")).await.unwrap();
        sink.close().await.unwrap();

        assert_eq!(server.await.unwrap(), b"raw-bytes");
    }
}
