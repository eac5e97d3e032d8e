//! In-process transport.
//!
//! Servers register under their public key; a client connecting to a
//! multiserver address is routed to the server whose key matches the
//! address's `shs` key. The handshake is a signed random challenge, so a
//! session is only opened for a client that holds the secret key of the
//! identity it claims.

use super::server::{InviteServer, Session};
use super::{Connector, RemoteSession, RpcError, UseRequest};
use crate::caps::{GET_ADDRESS, INVITE_USE};
use crate::keys::Keypair;
use crate::social::PublishedMessage;
use async_trait::async_trait;
use dashmap::DashMap;
use peerinvite_proto::{FeedId, MultiAddress};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const CHALLENGE_LEN: usize = 32;

/// Routes connections to servers running in the same process.
#[derive(Clone, Default)]
pub struct LocalConnector {
    servers: Arc<DashMap<String, Arc<InviteServer>>>,
}

impl LocalConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `server` reachable at any address carrying its key.
    pub fn register(&self, server: Arc<InviteServer>) {
        let key = server.id().key_base64().to_string();
        self.servers.insert(key, server);
    }

    pub fn unregister(&self, id: &FeedId) {
        self.servers.remove(id.key_base64());
    }
}

#[async_trait]
impl Connector for LocalConnector {
    async fn connect(
        &self,
        remote: &MultiAddress,
        keys: &Keypair,
        manifest: &[&str],
    ) -> Result<Box<dyn RemoteSession>, RpcError> {
        let server = self
            .servers
            .get(&remote.key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RpcError::Unreachable(remote.to_string()))?;

        let mut challenge = [0u8; CHALLENGE_LEN];
        OsRng.fill_bytes(&mut challenge);
        let signature = keys.sign(&challenge);
        let session = server
            .accept_handshake(keys.id(), &challenge, &signature)
            .await?;
        debug!(remote = %remote, local = %keys.id(), "local session established");
        Ok(Box::new(LocalSession {
            remote_id: server.id().clone(),
            server,
            session,
            manifest: manifest.iter().map(|m| m.to_string()).collect(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct LocalSession {
    remote_id: FeedId,
    server: Arc<InviteServer>,
    session: Session,
    manifest: Vec<String>,
    closed: AtomicBool,
}

impl LocalSession {
    fn ensure_callable(&self, method: &str) -> Result<(), RpcError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RpcError::Closed);
        }
        if !self.manifest.iter().any(|m| m == method) {
            return Err(RpcError::PermissionDenied(method.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSession for LocalSession {
    fn remote_id(&self) -> &FeedId {
        &self.remote_id
    }

    async fn invite_use(&self, req: UseRequest) -> Result<PublishedMessage, RpcError> {
        self.ensure_callable(INVITE_USE)?;
        self.server.invite_use(&self.session, req).await
    }

    async fn get_address(&self) -> Result<Option<String>, RpcError> {
        self.ensure_callable(GET_ADDRESS)?;
        self.server.get_address(&self.session).await
    }

    async fn close(&self) -> Result<(), RpcError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(remote = %self.remote_id, "local session closed");
        }
        Ok(())
    }
}
