//! Social graph collaborators.
//!
//! The invite flows only need two things from the social layer: the local
//! follow graph, and a way to publish a message on the local feed. Both are
//! expressed as traits so a node can plug in whatever feed database it runs.
//!
//! Only the two message shapes the invite flows produce are modelled:
//! `contact` (follow) and `pub` (relay announcement).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use peerinvite_proto::{FeedId, MultiAddress};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub mod memory;

pub use memory::{MemoryPeerBook, MemorySocialGraph};

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("feed is unavailable: {0}")]
    Unavailable(String),
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// A follow (or unfollow) of another feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub contact: FeedId,
    pub following: bool,
    #[serde(rename = "pub", default, skip_serializing_if = "Option::is_none")]
    pub pub_: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autofollow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Contact {
    /// Follow published by a pub that accepted an invite from `feed`.
    pub fn invited(feed: FeedId, note: Option<String>) -> Self {
        Self {
            contact: feed,
            following: true,
            pub_: Some(true),
            autofollow: None,
            note,
        }
    }

    /// Follow published by a client that redeemed an invite from `feed`.
    pub fn autofollow(feed: FeedId) -> Self {
        Self {
            contact: feed,
            following: true,
            pub_: None,
            autofollow: Some(true),
            note: None,
        }
    }
}

/// Address of a relay peer as announced in a `pub` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubAddress {
    pub host: String,
    pub port: u16,
    pub key: FeedId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubAnnouncement {
    pub address: PubAddress,
}

impl PubAnnouncement {
    pub fn new(host: impl Into<String>, port: u16, key: FeedId) -> Self {
        Self {
            address: PubAddress {
                host: host.into(),
                port,
                key,
            },
        }
    }
}

/// Message content, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Contact(Contact),
    Pub(PubAnnouncement),
}

/// A message after it has been appended to the local feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedMessage {
    pub author: FeedId,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub content: Content,
}

/// Snapshot of who follows whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowGraph {
    edges: HashMap<FeedId, HashSet<FeedId>>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` follows (or stopped following) `to`.
    pub fn set(&mut self, from: FeedId, to: FeedId, following: bool) {
        let targets = self.edges.entry(from).or_default();
        if following {
            targets.insert(to);
        } else {
            targets.remove(&to);
        }
    }

    pub fn follows(&self, from: &FeedId, to: &FeedId) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }
}

/// The local feed: follow graph queries and publication.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Identity that authors published messages.
    fn whoami(&self) -> &FeedId;

    /// Current follow graph.
    async fn follow_graph(&self) -> Result<FollowGraph, SocialError>;

    /// Append `content` to the local feed.
    async fn publish(&self, content: Content) -> Result<PublishedMessage, SocialError>;
}

/// Gossip address book.
pub trait PeerBook: Send + Sync {
    /// Remember `address` as a known peer, tagged with where it came from.
    fn add(&self, address: &MultiAddress, source: &str);
}
