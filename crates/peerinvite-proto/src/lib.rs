//! # peerinvite-proto
//!
//! Codec for the strings a peer hands out and parses when it issues or
//! redeems an invite:
//!
//! - feed identifiers (`@<base64 ed25519 key>.ed25519`)
//! - multiserver addresses (`net:host:port~shs:<key>`, `ws://host:port~shs:<key>`)
//! - invite codes in both historical encodings
//!
//! ## Invite encodings
//!
//! ```text
//! legacy:  <host>:<port>:<feed id>~<base64 seed>
//! modern:  <transport>~shs:<key>:<base64 seed>
//! ```
//!
//! A legacy code is normalized into the modern form before use:
//!
//! ```rust
//! use peerinvite_proto::{InviteCode, Transport};
//!
//! let seed = "A".repeat(43) + "=";
//! let key = "B".repeat(42) + "A=";
//! let raw = format!("203.0.113.5:8008:@{key}.ed25519~{seed}");
//!
//! let code: InviteCode = raw.parse().unwrap();
//! let modern = code.into_modern().unwrap();
//! assert_eq!(modern.remote.transport, Transport::Net { host: "203.0.113.5".into(), port: 8008 });
//! assert_eq!(modern.remote.key, key);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod feed;
pub mod invite;
pub mod seed;

pub use address::{parse_address_list, MultiAddress, Transport};
pub use error::{ParseError, Result};
pub use feed::FeedId;
pub use invite::{strip_quotes, InviteCode, InviteKind, LegacyInvite, ModernInvite};
pub use seed::Seed;
