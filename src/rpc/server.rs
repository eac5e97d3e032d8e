//! Serving side of the invite methods.
//!
//! Every session is opened through the authenticator chain and carries the
//! grant it was admitted with. Each call checks that grant before it runs;
//! failures of the method itself are reported as [`RpcError::Remote`] with
//! the invite error code attached.

use super::{RpcError, UseRequest};
use crate::addresses::{AddressScope, AddressSource};
use crate::caps::{
    AuthOutcome, Authenticator, GET_ADDRESS, INVITE_CREATE, INVITE_USE, Permissions,
};
use crate::error::InviteError;
use crate::invite::{CreateOptions, InviteIssuer, InviteRedeemer};
use crate::keys;
use crate::social::PublishedMessage;
use peerinvite_proto::FeedId;
use std::sync::Arc;
use tracing::{debug, trace};

/// An authorized inbound session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: FeedId,
    pub permissions: Permissions,
}

pub struct InviteServer {
    id: FeedId,
    auth: Arc<dyn Authenticator>,
    issuer: Arc<InviteIssuer>,
    redeemer: Arc<InviteRedeemer>,
    addresses: Arc<dyn AddressSource>,
}

impl InviteServer {
    pub fn new(
        id: FeedId,
        auth: Arc<dyn Authenticator>,
        issuer: Arc<InviteIssuer>,
        redeemer: Arc<InviteRedeemer>,
        addresses: Arc<dyn AddressSource>,
    ) -> Self {
        Self {
            id,
            auth,
            issuer,
            redeemer,
            addresses,
        }
    }

    /// Identity this server authenticates as.
    #[inline]
    pub fn id(&self) -> &FeedId {
        &self.id
    }

    /// Verify that `peer` signed `challenge`, then admit it.
    pub async fn accept_handshake(
        &self,
        peer: &FeedId,
        challenge: &[u8],
        signature: &[u8; 64],
    ) -> Result<Session, RpcError> {
        if !keys::verify(peer, challenge, signature) {
            debug!(peer = %peer, "handshake signature rejected");
            return Err(RpcError::Handshake("challenge signature rejected".into()));
        }
        self.open_session(peer).await
    }

    /// Admit a peer that has proven it holds the secret key for `peer`.
    pub async fn open_session(&self, peer: &FeedId) -> Result<Session, RpcError> {
        match self.auth.authenticate(peer).await {
            Ok(AuthOutcome::Granted(permissions)) => {
                debug!(peer = %peer, allow = ?permissions.allow, "session opened");
                Ok(Session {
                    id: peer.clone(),
                    permissions,
                })
            }
            Ok(AuthOutcome::Denied(reason)) => {
                debug!(peer = %peer, %reason, "session refused");
                Err(RpcError::Denied(reason))
            }
            Ok(AuthOutcome::NoOpinion) => {
                trace!(peer = %peer, "session refused: unknown key");
                Err(RpcError::Unauthorized)
            }
            Err(e) => Err(RpcError::Handshake(e.to_string())),
        }
    }

    /// `invite.use`: redeem one use of the invite the session key belongs to.
    pub async fn invite_use(
        &self,
        session: &Session,
        req: UseRequest,
    ) -> Result<PublishedMessage, RpcError> {
        check(session, INVITE_USE)?;
        self.redeemer
            .use_invite(&session.id, req)
            .await
            .map_err(remote)
    }

    /// `getAddress`: this server's public address.
    pub async fn get_address(&self, session: &Session) -> Result<Option<String>, RpcError> {
        check(session, GET_ADDRESS)?;
        Ok(self.addresses.get_address(AddressScope::Public))
    }

    /// `invite.create`: issue a new invite code.
    pub async fn invite_create(
        &self,
        session: &Session,
        opts: CreateOptions,
    ) -> Result<String, RpcError> {
        check(session, INVITE_CREATE)?;
        self.issuer.create(opts).await.map_err(remote)
    }
}

fn check(session: &Session, method: &str) -> Result<(), RpcError> {
    if session.permissions.allows(method) {
        trace!(peer = %session.id, method, "call permitted");
        Ok(())
    } else {
        debug!(peer = %session.id, method, "call denied");
        Err(RpcError::PermissionDenied(method.to_string()))
    }
}

fn remote(e: InviteError) -> RpcError {
    RpcError::Remote {
        code: e.error_code().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(permissions: Permissions) -> Session {
        Session {
            id: crate::keys::Keypair::generate().id().clone(),
            permissions,
        }
    }

    #[test]
    fn invite_grant_cannot_create() {
        let s = session(Permissions::invite());
        assert!(check(&s, INVITE_USE).is_ok());
        assert!(check(&s, GET_ADDRESS).is_ok());
        assert!(matches!(
            check(&s, INVITE_CREATE),
            Err(RpcError::PermissionDenied(m)) if m == INVITE_CREATE
        ));
    }

    #[test]
    fn spent_grant_cannot_use() {
        let s = session(Permissions::none());
        assert!(check(&s, INVITE_USE).is_err());
    }

    #[test]
    fn remote_errors_carry_codes() {
        match remote(InviteError::AlreadyFollowing) {
            RpcError::Remote { code, message } => {
                assert_eq!(code, "already_following");
                assert_eq!(message, "already following");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
