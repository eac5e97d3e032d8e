//! The invite lifecycle.
//!
//! - [`InviteIssuer`] mints a capability keypair, stores its record and
//!   encodes a portable invite code.
//! - [`InviteRedeemer`] serves `invite.use` for a session admitted with an
//!   invite key.
//! - [`InviteAcceptor`] is the client side: it parses a code, connects as
//!   the invite key, redeems it and follows the issuer back.

use crate::social::PublishedMessage;
use serde::Deserialize;

mod acceptor;
mod issuer;
mod redeemer;

pub use acceptor::{InviteAcceptor, MANIFEST};
pub use issuer::InviteIssuer;
pub use redeemer::{InviteRedeemer, MAX_REDEEM_ATTEMPTS};

/// Argument of `invite.create`: a bare use count or a full option set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CreateOptions {
    ByCount(u32),
    Options(InviteOptions),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InviteOptions {
    #[serde(default = "default_uses")]
    pub uses: u32,
    #[serde(default)]
    pub note: Option<String>,
    /// Emit a multiserver websocket code. Modern codes are always single use.
    #[serde(default)]
    pub modern: bool,
    /// Hostname to put in a legacy code instead of the advertised one.
    #[serde(default)]
    pub external: Option<String>,
}

fn default_uses() -> u32 {
    1
}

impl Default for InviteOptions {
    fn default() -> Self {
        Self {
            uses: default_uses(),
            note: None,
            modern: false,
            external: None,
        }
    }
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self::Options(InviteOptions::default())
    }
}

impl From<u32> for CreateOptions {
    fn from(uses: u32) -> Self {
        Self::ByCount(uses)
    }
}

impl From<InviteOptions> for CreateOptions {
    fn from(opts: InviteOptions) -> Self {
        Self::Options(opts)
    }
}

impl CreateOptions {
    /// Normalize into a single option set.
    pub fn resolve(self) -> InviteOptions {
        let mut opts = match self {
            Self::ByCount(uses) => InviteOptions {
                uses,
                ..InviteOptions::default()
            },
            Self::Options(opts) => opts,
        };
        if opts.modern || opts.uses == 0 {
            opts.uses = 1;
        }
        opts
    }
}

/// Argument of `invite.accept`: the code itself or `{ "invite": code }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AcceptInput {
    Code(String),
    Wrapped { invite: String },
}

impl AcceptInput {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Code(code) | Self::Wrapped { invite: code } => code,
        }
    }
}

impl From<&str> for AcceptInput {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

impl From<String> for AcceptInput {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

/// What the acceptor published after a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// Follow of the issuer.
    pub follow: PublishedMessage,
    /// Relay announcement for the issuer's address.
    pub announcement: Option<PublishedMessage>,
}
