//! Sink implementations
//!
//! Contains ConsoleSink and TcpSink.

mod console;
mod tcp;

pub use self::console::ConsoleSink;
pub use self::tcp::{Framing, TcpSink, TcpSinkConfig};
