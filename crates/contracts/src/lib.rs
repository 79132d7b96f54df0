//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - `Message` is an immutable string payload; duplicates are legal and independent
//! - Fan-out clones are O(1), the text lives behind a shared pointer

mod blueprint;
mod error;
mod message;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use message::Message;
pub use sink::EventSink;
