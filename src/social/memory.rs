//! In-memory social graph and peer book.

use super::{Content, FollowGraph, PeerBook, PublishedMessage, SocialError, SocialGraph};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use peerinvite_proto::{FeedId, MultiAddress};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// A single local feed kept in memory.
///
/// The follow graph is derived from the `contact` messages in the log, so
/// anything published through [`SocialGraph::publish`] is immediately
/// visible to [`SocialGraph::follow_graph`].
pub struct MemorySocialGraph {
    id: FeedId,
    log: Mutex<Vec<PublishedMessage>>,
    /// Extra edges seeded by tests or imported from other feeds.
    external: Mutex<FollowGraph>,
    offline: AtomicBool,
}

impl MemorySocialGraph {
    pub fn new(id: FeedId) -> Self {
        Self {
            id,
            log: Mutex::new(Vec::new()),
            external: Mutex::new(FollowGraph::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Record a follow edge authored by some other feed.
    pub fn add_edge(&self, from: FeedId, to: FeedId) {
        self.external.lock().set(from, to, true);
    }

    /// Make every subsequent call fail, as if the feed database went away.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Messages published so far, oldest first.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.log.lock().clone()
    }

    /// Content of the messages published so far.
    pub fn contents(&self) -> Vec<Content> {
        self.log.lock().iter().map(|m| m.content.clone()).collect()
    }

    fn check_online(&self) -> Result<(), SocialError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SocialError::Unavailable(self.id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SocialGraph for MemorySocialGraph {
    fn whoami(&self) -> &FeedId {
        &self.id
    }

    async fn follow_graph(&self) -> Result<FollowGraph, SocialError> {
        self.check_online()?;
        let mut graph = self.external.lock().clone();
        for message in self.log.lock().iter() {
            if let Content::Contact(contact) = &message.content {
                graph.set(self.id.clone(), contact.contact.clone(), contact.following);
            }
        }
        Ok(graph)
    }

    async fn publish(&self, content: Content) -> Result<PublishedMessage, SocialError> {
        self.check_online()?;
        let mut log = self.log.lock();
        let message = PublishedMessage {
            author: self.id.clone(),
            sequence: log.len() as u64 + 1,
            timestamp: Utc::now(),
            content,
        };
        debug!(author = %self.id, sequence = message.sequence, "published message");
        log.push(message.clone());
        Ok(message)
    }
}

/// Address book that just remembers what it was told.
#[derive(Default)]
pub struct MemoryPeerBook {
    peers: Mutex<Vec<(MultiAddress, String)>>,
}

impl MemoryPeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peers(&self) -> Vec<(MultiAddress, String)> {
        self.peers.lock().clone()
    }
}

impl PeerBook for MemoryPeerBook {
    fn add(&self, address: &MultiAddress, source: &str) {
        let mut peers = self.peers.lock();
        if !peers.iter().any(|(known, _)| known == address) {
            peers.push((address.clone(), source.to_string()));
        }
    }
}
