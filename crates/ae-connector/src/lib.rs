//! # ae-connector — Gaming backend transport
//!
//! Typed request/response channel to the gaming backend, plus an offline
//! mock that answers login, balance and spin requests locally.
//!
//! ## Features
//!
//! - `Transport` trait for pluggable backends
//! - `MockTransport` with fixed connect/reply delays
//! - Reply broadcast for fire-and-forget requests

pub mod connector;
pub mod protocol;

pub use connector::*;
pub use protocol::*;
