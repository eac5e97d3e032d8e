//! In-process test peers.

use async_trait::async_trait;
use peerinvite::config::Config;
use peerinvite::keys::Keypair;
use peerinvite::proto::{MultiAddress, Seed};
use peerinvite::rpc::{Connector, LocalConnector, RemoteSession, RpcError};
use peerinvite::social::{MemoryPeerBook, MemorySocialGraph};
use peerinvite::store::{InviteStore, MemoryInviteStore};
use peerinvite::{InviteNode, NodeParams};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A set of peers that can reach each other through one [`LocalConnector`].
#[derive(Default)]
pub struct TestNetwork {
    pub connector: LocalConnector,
}

/// One peer and the collaborators it was built from.
pub struct TestPeer {
    pub node: InviteNode,
    pub store: Arc<MemoryInviteStore>,
    pub social: Arc<MemorySocialGraph>,
    pub peers: Arc<MemoryPeerBook>,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// A peer advertising `public` transports.
    pub fn pub_server(&self, public: &[&str], allow_private: bool) -> TestPeer {
        let public = public
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let config = Config::parse(&format!(
            r#"
[server]
name = "test.pub"

[addresses]
public = [{public}]

[invite]
allow_private = {allow_private}

[accept]
backoff_base_ms = 10
"#
        ))
        .expect("test config parses");
        self.peer_with(&config, Arc::new(MemoryInviteStore::new()), Arc::new(self.connector.clone()))
    }

    /// A peer with no addresses that only accepts invites.
    pub fn client(&self) -> TestPeer {
        self.client_with(Arc::new(self.connector.clone()))
    }

    pub fn client_with(&self, connector: Arc<dyn Connector>) -> TestPeer {
        let config = Config::parse("[server]\nname = \"test.client\"\n[accept]\nbackoff_base_ms = 10\n")
            .expect("test config parses");
        self.peer_with(&config, Arc::new(MemoryInviteStore::new()), connector)
    }

    pub fn peer_with(
        &self,
        config: &Config,
        store: Arc<MemoryInviteStore>,
        connector: Arc<dyn Connector>,
    ) -> TestPeer {
        let keys = Keypair::generate();
        let social = Arc::new(MemorySocialGraph::new(keys.id().clone()));
        let peers = Arc::new(MemoryPeerBook::new());
        let node = InviteNode::new(NodeParams {
            config,
            keys,
            store: store.clone(),
            social: social.clone(),
            connector,
            peers: Some(peers.clone()),
        });
        self.connector.register(node.server());
        TestPeer {
            node,
            store,
            social,
            peers,
        }
    }
}

impl TestPeer {
    /// Redemptions recorded for the invite behind `code`.
    pub async fn used(&self, code: &str) -> u32 {
        let id = invite_keys(code).id().clone();
        self.store
            .get(&id)
            .await
            .expect("store readable")
            .expect("invite recorded")
            .used
    }
}

/// Keypair an acceptor derives from `code`.
pub fn invite_keys(code: &str) -> Keypair {
    let seed: Seed = code
        .parse::<peerinvite::proto::InviteCode>()
        .expect("valid code")
        .into_modern()
        .expect("code has a secret")
        .seed;
    Keypair::from_seed(&seed)
}

/// Connector whose first `failures` attempts fail as unreachable.
pub struct FlakyConnector {
    inner: LocalConnector,
    failures: u32,
    pub attempts: AtomicU32,
}

impl FlakyConnector {
    pub fn new(inner: LocalConnector, failures: u32) -> Self {
        Self {
            inner,
            failures,
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Connector for FlakyConnector {
    async fn connect(
        &self,
        remote: &MultiAddress,
        keys: &Keypair,
        manifest: &[&str],
    ) -> Result<Box<dyn RemoteSession>, RpcError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(RpcError::Unreachable(format!("{remote} (attempt {attempt})")));
        }
        self.inner.connect(remote, keys, manifest).await
    }
}
