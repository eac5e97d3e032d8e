//! Invite-aware authorization hook.
//!
//! Wraps an existing [`Authenticator`] so that a key which the normal chain
//! knows nothing about can still be admitted if it matches an invite. The
//! invite grant is looked up on every attempt; nothing is cached.

use super::authenticator::{AuthError, AuthOutcome, Authenticator, DenyReason};
use super::permissions::Permissions;
use async_trait::async_trait;
use peerinvite_proto::FeedId;
use std::sync::Arc;
use tracing::debug;

/// Invite state relevant to authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteGrant {
    pub permissions: Permissions,
    pub exhausted: bool,
}

/// Source of invite grants keyed by the invite's public key.
///
/// Lookups are best-effort: a backend failure is reported as "not found".
#[async_trait]
pub trait GrantLookup: Send + Sync {
    async fn lookup(&self, id: &FeedId) -> Option<InviteGrant>;
}

/// Authenticator that falls back to invite records.
pub struct InviteAuthHook<L: ?Sized> {
    inner: Arc<dyn Authenticator>,
    invites: Arc<L>,
}

impl<L: GrantLookup + ?Sized> InviteAuthHook<L> {
    /// Wrap `inner`, consulting `invites` when it has no opinion.
    pub fn new(inner: Arc<dyn Authenticator>, invites: Arc<L>) -> Self {
        Self { inner, invites }
    }
}

#[async_trait]
impl<L: GrantLookup + ?Sized> Authenticator for InviteAuthHook<L> {
    async fn authenticate(&self, id: &FeedId) -> Result<AuthOutcome, AuthError> {
        match self.inner.authenticate(id).await? {
            AuthOutcome::NoOpinion => {}
            decided => return Ok(decided),
        }

        match self.invites.lookup(id).await {
            Some(grant) if grant.exhausted => {
                debug!(peer = %id, "refusing exhausted invite key");
                Ok(AuthOutcome::Denied(DenyReason::InviteExhausted))
            }
            Some(grant) => {
                debug!(peer = %id, allow = ?grant.permissions.allow, "granting invite permissions");
                Ok(AuthOutcome::Granted(grant.permissions))
            }
            None => Ok(AuthOutcome::NoOpinion),
        }
    }
}
