//! Remote procedure seam.
//!
//! The invite flows talk to a remote peer through two traits:
//! [`Connector`] opens an authenticated session as a given keypair, and
//! [`RemoteSession`] exposes the handful of remote methods an invite holder
//! may call. The wire framing of a real transport lives behind these traits.
//!
//! The serving side is [`InviteServer`], which authorizes sessions through
//! the authenticator chain and checks every call against the session grant.
//! [`LocalConnector`] joins the two in-process.

use crate::caps::DenyReason;
use crate::keys::Keypair;
use crate::social::PublishedMessage;
use async_trait::async_trait;
use peerinvite_proto::{FeedId, MultiAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod local;
pub mod server;

pub use local::LocalConnector;
pub use server::{InviteServer, Session};

/// Argument of `invite.use`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseRequest {
    /// Feed the issuer should follow.
    #[serde(default)]
    pub feed: Option<FeedId>,
}

impl UseRequest {
    pub fn new(feed: FeedId) -> Self {
        Self { feed: Some(feed) }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("no peer reachable at {0}")]
    Unreachable(String),

    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The remote authenticator had no opinion on our key.
    #[error("peer not authorized")]
    Unauthorized,

    /// The remote authenticator explicitly refused our key.
    #[error("session refused: {0}")]
    Denied(DenyReason),

    #[error("method not permitted: {0}")]
    PermissionDenied(String),

    /// The remote method ran and failed.
    #[error("{message}")]
    Remote { code: String, message: String },

    #[error("session closed")]
    Closed,
}

impl RpcError {
    /// Whether opening a session again could succeed.
    ///
    /// Explicit refusals are final; everything else may be a peer that is
    /// not ready yet.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Denied(_))
    }
}

/// Opens sessions to remote peers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `remote`, authenticating as `keys`, and request access to
    /// the methods named in `manifest`.
    async fn connect(
        &self,
        remote: &MultiAddress,
        keys: &Keypair,
        manifest: &[&str],
    ) -> Result<Box<dyn RemoteSession>, RpcError>;
}

/// An open session with a remote peer.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Identity of the peer on the other end.
    fn remote_id(&self) -> &FeedId;

    /// Call `invite.use`.
    async fn invite_use(&self, req: UseRequest) -> Result<PublishedMessage, RpcError>;

    /// Call `getAddress`.
    async fn get_address(&self) -> Result<Option<String>, RpcError>;

    /// Close the session. Closing an already closed session is a no-op.
    async fn close(&self) -> Result<(), RpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_request_feed_is_optional_on_the_wire() {
        let req: UseRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.feed, None);
    }

    #[test]
    fn only_explicit_denials_are_final() {
        assert!(RpcError::Unreachable("x".into()).is_retryable());
        assert!(RpcError::Unauthorized.is_retryable());
        assert!(!RpcError::Denied(DenyReason::InviteExhausted).is_retryable());
    }
}
