//! peerinvite - capability invite codes for peer-to-peer trust bootstrap.
//!
//! A peer issues an invite code carrying a fresh secret. Whoever holds the
//! code connects to the issuer as the keypair derived from that secret,
//! redeems one use of the invite, and the two peers follow each other.
//!
//! The string codec lives in [`peerinvite_proto`]; this crate holds the
//! stateful parts: the invite store, the authorization hook that admits
//! invite keys, the redemption handler and the accepting client.

pub mod addresses;
pub mod caps;
pub mod config;
pub mod error;
pub mod invite;
pub mod keys;
pub mod node;
pub mod retry;
pub mod rpc;
pub mod social;
pub mod store;
pub mod telemetry;

pub use error::{InviteError, InviteResult};
pub use node::{InviteNode, NodeParams};
pub use peerinvite_proto as proto;
