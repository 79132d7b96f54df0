//! Message - the unit of delivery

use std::fmt;
use std::sync::Arc;

/// Immutable string payload flowing through the pipeline.
///
/// Carries no identity beyond its value; two messages with the same text
/// are interchangeable. Cloning shares the underlying text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    text: Arc<str>,
}

impl Message {
    /// Create a message from any string-like value
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// Message text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Message payload as UTF-8 bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
