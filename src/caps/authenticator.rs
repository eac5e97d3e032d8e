//! Authentication decision sources.

use super::permissions::Permissions;
use async_trait::async_trait;
use peerinvite_proto::FeedId;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Why an authenticator refused a key outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The key belongs to an invite whose uses are spent.
    InviteExhausted,
    /// Any other explicit refusal.
    Other(String),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InviteExhausted => f.write_str("invite exhausted"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// Result of asking an authenticator about a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The key may open a session with these permissions.
    Granted(Permissions),
    /// The key is known and must not be admitted.
    Denied(DenyReason),
    /// This source knows nothing about the key.
    NoOpinion,
}

/// Failure inside an authenticator backend.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication backend error: {0}")]
    Backend(String),
}

/// One source of authorization decisions.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Decide what `id` may do.
    async fn authenticate(&self, id: &FeedId) -> Result<AuthOutcome, AuthError>;
}

/// Grants unrestricted rights to the node's own administrative keys.
pub struct MasterAuthenticator {
    masters: Vec<FeedId>,
}

impl MasterAuthenticator {
    pub fn new(masters: Vec<FeedId>) -> Self {
        Self { masters }
    }
}

#[async_trait]
impl Authenticator for MasterAuthenticator {
    async fn authenticate(&self, id: &FeedId) -> Result<AuthOutcome, AuthError> {
        if self.masters.contains(id) {
            trace!(peer = %id, "master key authenticated");
            Ok(AuthOutcome::Granted(Permissions::unrestricted()))
        } else {
            Ok(AuthOutcome::NoOpinion)
        }
    }
}
