//! Server side of `invite.use`.

use crate::error::{InviteError, InviteResult};
use crate::rpc::UseRequest;
use crate::social::{Contact, Content, PublishedMessage, SocialGraph};
use crate::store::{InviteRecord, InviteStore};
use crate::telemetry::spans;
use peerinvite_proto::FeedId;
use std::sync::Arc;
use tracing::{Instrument, debug, info};

/// How many times a strict redemption re-reads a record that changed under it.
pub const MAX_REDEEM_ATTEMPTS: u32 = 5;

pub struct InviteRedeemer {
    store: Arc<dyn InviteStore>,
    social: Arc<dyn SocialGraph>,
    strict_usage_count: bool,
}

impl InviteRedeemer {
    /// With `strict_usage_count` unset, two concurrent redemptions of the same
    /// invite may both succeed past its use count.
    pub fn new(
        store: Arc<dyn InviteStore>,
        social: Arc<dyn SocialGraph>,
        strict_usage_count: bool,
    ) -> Self {
        Self {
            store,
            social,
            strict_usage_count,
        }
    }

    /// Redeem one use of the invite keyed by `caller`, the session identity,
    /// and follow `req.feed`.
    pub async fn use_invite(
        &self,
        caller: &FeedId,
        req: UseRequest,
    ) -> InviteResult<PublishedMessage> {
        let span = spans::redeem(caller);
        async move {
            let (record, feed) = self.consume(caller, &req).await?;
            info!(
                target: "audit",
                invite = %caller,
                action = "use",
                feed = %feed,
                note = record.note.as_deref().unwrap_or(""),
                "invite redeemed"
            );
            let contact = Contact::invited(feed, record.note);
            self.social
                .publish(Content::Contact(contact))
                .await
                .map_err(InviteError::PublishFailure)
        }
        .instrument(span)
        .await
    }

    /// Count one use and persist it. Returns the updated record and the feed
    /// to follow.
    async fn consume(
        &self,
        caller: &FeedId,
        req: &UseRequest,
    ) -> InviteResult<(InviteRecord, FeedId)> {
        for attempt in 1..=MAX_REDEEM_ATTEMPTS {
            let mut record = self
                .store
                .get(caller)
                .await?
                .ok_or(InviteError::InviteNotFound)?;

            let graph = self
                .social
                .follow_graph()
                .await
                .map_err(InviteError::FollowGraph)?;
            if let Some(feed) = &req.feed
                && graph.follows(self.social.whoami(), feed)
            {
                return Err(InviteError::AlreadyFollowing);
            }

            let feed = req.feed.clone().ok_or(InviteError::MissingFeed)?;
            if record.is_exhausted() {
                return Err(InviteError::InviteExpired);
            }

            let previous = record.used;
            record.redeem();

            if !self.strict_usage_count {
                self.store.put(caller, &record).await?;
                return Ok((record, feed));
            }
            if self.store.put_if_unchanged(&record, previous).await? {
                return Ok((record, feed));
            }
            debug!(invite = %caller, attempt, "invite changed during redemption, retrying");
        }
        Err(InviteError::Contended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;
    use crate::social::MemorySocialGraph;
    use crate::store::{MemoryInviteStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixture {
        store: Arc<MemoryInviteStore>,
        social: Arc<MemorySocialGraph>,
        invite: Keypair,
    }

    async fn fixture(total: u32, note: Option<&str>) -> Fixture {
        let store = Arc::new(MemoryInviteStore::new());
        let social = Arc::new(MemorySocialGraph::new(Keypair::generate().id().clone()));
        let invite = Keypair::generate();
        let record = InviteRecord::new(invite.id().clone(), total, note.map(String::from));
        store.put(invite.id(), &record).await.unwrap();
        Fixture {
            store,
            social,
            invite,
        }
    }

    fn redeemer(f: &Fixture, strict: bool) -> InviteRedeemer {
        InviteRedeemer::new(f.store.clone(), f.social.clone(), strict)
    }

    fn newcomer() -> FeedId {
        Keypair::generate().id().clone()
    }

    #[tokio::test]
    async fn redeem_publishes_pub_follow_with_note() {
        let f = fixture(1, Some("welcome")).await;
        let feed = newcomer();
        let msg = redeemer(&f, true)
            .use_invite(f.invite.id(), UseRequest::new(feed.clone()))
            .await
            .unwrap();

        match msg.content {
            Content::Contact(contact) => {
                assert_eq!(contact.contact, feed);
                assert!(contact.following);
                assert_eq!(contact.pub_, Some(true));
                assert_eq!(contact.note.as_deref(), Some("welcome"));
            }
            other => panic!("unexpected {other:?}"),
        }
        let record = f.store.get(f.invite.id()).await.unwrap().unwrap();
        assert_eq!(record.used, 1);
        assert!(record.permissions.is_empty());
    }

    #[tokio::test]
    async fn exactly_n_uses() {
        for strict in [true, false] {
            let f = fixture(3, None).await;
            let redeemer = redeemer(&f, strict);
            for _ in 0..3 {
                redeemer
                    .use_invite(f.invite.id(), UseRequest::new(newcomer()))
                    .await
                    .unwrap();
            }
            let err = redeemer
                .use_invite(f.invite.id(), UseRequest::new(newcomer()))
                .await
                .unwrap_err();
            assert!(matches!(err, InviteError::InviteExpired), "{err}");
            assert_eq!(f.store.get(f.invite.id()).await.unwrap().unwrap().used, 3);
        }
    }

    #[tokio::test]
    async fn missing_feed_fails_in_any_state() {
        let f = fixture(1, None).await;
        let redeemer = redeemer(&f, true);
        let err = redeemer
            .use_invite(f.invite.id(), UseRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::MissingFeed));

        redeemer
            .use_invite(f.invite.id(), UseRequest::new(newcomer()))
            .await
            .unwrap();
        let err = redeemer
            .use_invite(f.invite.id(), UseRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::MissingFeed));
    }

    #[tokio::test]
    async fn already_following_leaves_record_alone() {
        let f = fixture(2, None).await;
        let feed = newcomer();
        f.social.add_edge(f.social.whoami().clone(), feed.clone());

        let err = redeemer(&f, true)
            .use_invite(f.invite.id(), UseRequest::new(feed))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::AlreadyFollowing));
        assert_eq!(f.store.get(f.invite.id()).await.unwrap().unwrap().used, 0);
        assert!(f.social.messages().is_empty());
    }

    #[tokio::test]
    async fn unknown_invite() {
        let f = fixture(1, None).await;
        let err = redeemer(&f, true)
            .use_invite(&newcomer(), UseRequest::new(newcomer()))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::InviteNotFound));
    }

    #[tokio::test]
    async fn feed_database_outage_is_reported() {
        let f = fixture(1, None).await;
        f.social.set_offline(true);
        let err = redeemer(&f, true)
            .use_invite(f.invite.id(), UseRequest::new(newcomer()))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::FollowGraph(_)));
    }

    /// Store whose compare-and-put loses the race a fixed number of times.
    struct Racy {
        inner: MemoryInviteStore,
        losses: AtomicU32,
    }

    #[async_trait]
    impl InviteStore for Racy {
        async fn get(&self, id: &FeedId) -> Result<Option<InviteRecord>, StoreError> {
            self.inner.get(id).await
        }

        async fn put(&self, id: &FeedId, record: &InviteRecord) -> Result<(), StoreError> {
            self.inner.put(id, record).await
        }

        async fn put_if_unchanged(
            &self,
            record: &InviteRecord,
            expected_used: u32,
        ) -> Result<bool, StoreError> {
            if self.losses.load(Ordering::SeqCst) > 0 {
                self.losses.fetch_sub(1, Ordering::SeqCst);
                return Ok(false);
            }
            self.inner.put_if_unchanged(record, expected_used).await
        }
    }

    async fn racy(losses: u32) -> (Arc<Racy>, Keypair) {
        let invite = Keypair::generate();
        let inner = MemoryInviteStore::new();
        inner
            .put(invite.id(), &InviteRecord::new(invite.id().clone(), 1, None))
            .await
            .unwrap();
        let store = Arc::new(Racy {
            inner,
            losses: AtomicU32::new(losses),
        });
        (store, invite)
    }

    #[tokio::test]
    async fn strict_redemption_retries_lost_races() {
        let (store, invite) = racy(MAX_REDEEM_ATTEMPTS - 1).await;
        let social = Arc::new(MemorySocialGraph::new(newcomer()));
        let redeemer = InviteRedeemer::new(store.clone(), social, true);
        redeemer
            .use_invite(invite.id(), UseRequest::new(newcomer()))
            .await
            .unwrap();
        assert_eq!(store.get(invite.id()).await.unwrap().unwrap().used, 1);
    }

    #[tokio::test]
    async fn strict_redemption_gives_up() {
        let (store, invite) = racy(MAX_REDEEM_ATTEMPTS).await;
        let social = Arc::new(MemorySocialGraph::new(newcomer()));
        let redeemer = InviteRedeemer::new(store.clone(), social.clone(), true);
        let err = redeemer
            .use_invite(invite.id(), UseRequest::new(newcomer()))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::Contended));
        assert_eq!(store.get(invite.id()).await.unwrap().unwrap().used, 0);
        assert!(social.messages().is_empty());
    }
}
