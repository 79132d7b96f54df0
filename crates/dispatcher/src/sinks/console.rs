//! ConsoleSink - writes messages to standard output

use async_trait::async_trait;
use contracts::{ContractError, EventSink, Message};
use tokio::io::{AsyncWriteExt, Stdout};
use tracing::{debug, instrument};

/// Sink that writes line-framed messages to stdout
///
/// Line framing is this sink's own policy; the dispatcher hands over raw
/// payload bytes only.
pub struct ConsoleSink {
    name: String,
    stdout: Option<Stdout>,
}

impl ConsoleSink {
    /// Create a new ConsoleSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stdout: None,
        }
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "console_sink_initialize", skip(self), fields(sink = %self.name))]
    async fn initialize(&mut self) -> Result<(), ContractError> {
        self.stdout = Some(tokio::io::stdout());
        debug!(sink = %self.name, "console sink ready");
        Ok(())
    }

    #[instrument(
        name = "console_sink_deliver",
        skip(self, message),
        fields(sink = %self.name, payload_len = message.len())
    )]
    async fn deliver(&mut self, message: &Message) -> Result<(), ContractError> {
        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| ContractError::sink_not_ready(&self.name))?;

        let write = async {
            stdout.write_all(message.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            Ok::<(), std::io::Error>(())
        };

        write
            .await
            .map_err(|e| ContractError::sink_transport(&self.name, e.to_string()))
    }

    #[instrument(name = "console_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(stdout) = self.stdout.as_mut() {
            stdout
                .flush()
                .await
                .map_err(|e| ContractError::sink_transport(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "console_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.stdout = None;
        debug!(sink = %self.name, "console sink closed");
        Ok(())
    }
}
