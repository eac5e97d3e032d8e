//! Node wiring.
//!
//! An [`InviteNode`] is one peer with its identity, its invite store, the
//! authorization chain that admits invite keys, and both halves of the
//! invite protocol.

use crate::addresses::{AddressSource, ConfigAddresses};
use crate::caps::{Authenticator, InviteAuthHook, MasterAuthenticator};
use crate::config::Config;
use crate::error::InviteResult;
use crate::invite::{
    AcceptInput, AcceptOutcome, CreateOptions, InviteAcceptor, InviteIssuer, InviteRedeemer,
};
use crate::keys::Keypair;
use crate::rpc::{Connector, InviteServer};
use crate::social::{PeerBook, SocialGraph};
use crate::store::{InviteRecord, InviteStore};
use peerinvite_proto::FeedId;
use std::sync::Arc;

/// Parameters for creating a new InviteNode.
pub struct NodeParams<'a, S: InviteStore + 'static> {
    pub config: &'a Config,
    pub keys: Keypair,
    pub store: Arc<S>,
    pub social: Arc<dyn SocialGraph>,
    pub connector: Arc<dyn Connector>,
    pub peers: Option<Arc<dyn PeerBook>>,
}

pub struct InviteNode {
    keys: Keypair,
    store: Arc<dyn InviteStore>,
    issuer: Arc<InviteIssuer>,
    acceptor: InviteAcceptor,
    server: Arc<InviteServer>,
}

impl InviteNode {
    pub fn new<S: InviteStore + 'static>(params: NodeParams<'_, S>) -> Self {
        let NodeParams {
            config,
            keys,
            store,
            social,
            connector,
            peers,
        } = params;

        let addresses: Arc<dyn AddressSource> =
            Arc::new(ConfigAddresses::new(&config.addresses, keys.id()));
        let master = MasterAuthenticator::new(vec![keys.id().clone()]);
        let auth: Arc<dyn Authenticator> =
            Arc::new(InviteAuthHook::new(Arc::new(master), Arc::clone(&store)));

        let store: Arc<dyn InviteStore> = store;
        let issuer = Arc::new(InviteIssuer::new(
            Arc::clone(&store),
            Arc::clone(&addresses),
            config.invite.allow_private,
        ));
        let redeemer = Arc::new(InviteRedeemer::new(
            Arc::clone(&store),
            Arc::clone(&social),
            config.invite.strict_usage_count,
        ));
        let server = Arc::new(InviteServer::new(
            keys.id().clone(),
            auth,
            Arc::clone(&issuer),
            redeemer,
            addresses,
        ));

        let mut acceptor = InviteAcceptor::new(social, connector)
            .with_retry(config.accept.max_attempts, config.accept.backoff_base());
        if let Some(peers) = peers {
            acceptor = acceptor.with_peer_book(peers);
        }

        Self {
            keys,
            store,
            issuer,
            acceptor,
            server,
        }
    }

    #[inline]
    pub fn id(&self) -> &FeedId {
        self.keys.id()
    }

    /// The serving side, for registering with a transport.
    pub fn server(&self) -> Arc<InviteServer> {
        Arc::clone(&self.server)
    }

    /// Issue an invite as this node's own administrator.
    pub async fn create(&self, opts: impl Into<CreateOptions>) -> InviteResult<String> {
        self.issuer.create(opts).await
    }

    /// Redeem an invite received out-of-band.
    pub async fn accept(&self, input: impl Into<AcceptInput>) -> InviteResult<AcceptOutcome> {
        self.acceptor.accept(input).await
    }

    /// Stored state of the invite keyed by `id`.
    pub async fn inspect(&self, id: &FeedId) -> InviteResult<Option<InviteRecord>> {
        Ok(self.store.get(id).await?)
    }
}
