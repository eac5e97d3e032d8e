//! Integration test common infrastructure.
//!
//! Provides an in-process network of peers joined by the loopback
//! transport, plus connectors that misbehave on purpose.

pub mod network;

#[allow(unused_imports)]
pub use network::{FlakyConnector, TestNetwork, TestPeer};
