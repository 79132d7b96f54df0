//! Out-of-band delivery failure reports

use contracts::{ContractError, Message};

/// One failed (message, sink) delivery
///
/// Forwarded on the dispatcher's failure channel so the hosting application
/// observes failures without them ever aborting the drain loop.
#[derive(Debug)]
pub struct DeliveryFailure {
    /// Name of the sink that failed
    pub sink_name: String,
    /// The message whose delivery failed
    pub message: Message,
    /// The underlying sink error
    pub error: ContractError,
}

impl std::fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "delivery to '{}' failed: {} (payload {} bytes)",
            self.sink_name,
            self.error,
            self.message.len()
        )
    }
}
