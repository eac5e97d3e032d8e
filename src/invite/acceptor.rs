//! Client side of invite redemption.

use super::{AcceptInput, AcceptOutcome};
use crate::caps::{DenyReason, GET_ADDRESS, INVITE_USE};
use crate::error::{InviteError, InviteResult};
use crate::keys::Keypair;
use crate::retry::{linear_backoff, retry_with_backoff};
use crate::rpc::{Connector, RpcError, UseRequest};
use crate::social::{Contact, Content, PeerBook, PubAnnouncement, SocialGraph};
use crate::telemetry::spans;
use peerinvite_proto::{FeedId, InviteCode, InviteKind, ModernInvite};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, warn};

/// Remote methods requested when connecting with an invite key.
pub const MANIFEST: [&str; 2] = [INVITE_USE, GET_ADDRESS];

pub struct InviteAcceptor {
    social: Arc<dyn SocialGraph>,
    connector: Arc<dyn Connector>,
    peers: Option<Arc<dyn PeerBook>>,
    max_attempts: u32,
    backoff_base: Duration,
}

impl InviteAcceptor {
    pub fn new(social: Arc<dyn SocialGraph>, connector: Arc<dyn Connector>) -> Self {
        Self {
            social,
            connector,
            peers: None,
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
        }
    }

    /// Register redeemed issuers as gossip peers.
    pub fn with_peer_book(mut self, peers: Arc<dyn PeerBook>) -> Self {
        self.peers = Some(peers);
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff_base: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.backoff_base = backoff_base;
        self
    }

    /// Redeem `input` against its issuer and follow the issuer back.
    pub async fn accept(&self, input: impl Into<AcceptInput>) -> InviteResult<AcceptOutcome> {
        let input = input.into();
        let code: InviteCode = input.as_str().parse()?;
        let kind = code.kind();
        let invite = code.into_modern()?;
        let issuer = invite.issuer()?;
        self.redeem(kind, invite, issuer)
            .instrument(spans::accept(kind))
            .await
    }

    async fn redeem(
        &self,
        kind: InviteKind,
        invite: ModernInvite,
        issuer: FeedId,
    ) -> InviteResult<AcceptOutcome> {
        let keys = Keypair::from_seed(&invite.seed);
        debug!(?kind, remote = %invite.remote, invite = %keys.id(), "accepting invite");

        let connector = &self.connector;
        let remote = &invite.remote;
        let keys = &keys;
        let session = retry_with_backoff(
            self.max_attempts,
            linear_backoff(self.backoff_base),
            RpcError::is_retryable,
            move || connector.connect(remote, keys, &MANIFEST),
        )
        .await
        .map_err(|e| match e {
            RpcError::Denied(DenyReason::InviteExhausted) => InviteError::InviteExpired,
            e => InviteError::ConnectFailure(e),
        })?;

        let me = self.social.whoami().clone();
        if let Err(e) = session.invite_use(UseRequest::new(me)).await {
            let _ = session.close().await;
            return Err(InviteError::RedemptionRejected(e));
        }

        let host = remote.host();
        let follow = self
            .social
            .publish(Content::Contact(Contact::autofollow(issuer.clone())));
        let announce = async {
            if host.is_empty() {
                return Ok(None);
            }
            let announcement = PubAnnouncement::new(host, remote.port(), issuer.clone());
            self.social.publish(Content::Pub(announcement)).await.map(Some)
        };
        let (follow, announcement) = tokio::join!(follow, announce);

        if let Err(e) = session.close().await {
            warn!(error = %e, "closing invite session failed");
        }
        let follow = follow.map_err(InviteError::PublishFailure)?;
        let announcement = announcement.map_err(InviteError::PublishFailure)?;

        if let Some(peers) = &self.peers {
            peers.add(remote, "seed");
        }
        info!(issuer = %issuer, "invite accepted");
        Ok(AcceptOutcome {
            follow,
            announcement,
        })
    }
}
