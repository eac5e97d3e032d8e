//! Invite record persistence.
//!
//! One record per issued invite, keyed by the invite's public key, in a
//! dedicated `invites` partition. There are no transactions across calls:
//! callers own any read-modify-write race, though
//! [`InviteStore::put_if_unchanged`] gives them a compare-and-put to close it.

use crate::caps::{GrantLookup, InviteGrant, Permissions};
use async_trait::async_trait;
use peerinvite_proto::FeedId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod memory;
pub mod redb;

pub use memory::MemoryInviteStore;
pub use self::redb::RedbInviteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] ::redb::DatabaseError),
    #[error("table error: {0}")]
    Table(#[from] ::redb::TableError),
    #[error("storage error: {0}")]
    Storage(#[from] ::redb::StorageError),
    #[error("transaction error: {0}")]
    Transaction(#[from] ::redb::TransactionError),
    #[error("commit error: {0}")]
    Commit(#[from] ::redb::CommitError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted state of one issued invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
    /// Public key derived from the invite seed.
    pub id: FeedId,
    /// Maximum number of redemptions.
    pub total: u32,
    /// Redemptions so far.
    pub used: u32,
    /// Copied onto the follow record published on redemption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub permissions: Permissions,
}

impl InviteRecord {
    /// A fresh record with the default invite grant.
    pub fn new(id: FeedId, total: u32, note: Option<String>) -> Self {
        Self {
            id,
            total,
            used: 0,
            note,
            permissions: Permissions::invite(),
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.total
    }

    /// Count one redemption. The grant is emptied in the same step that
    /// spends the last use.
    pub fn redeem(&mut self) {
        self.used += 1;
        if self.is_exhausted() {
            self.permissions = Permissions::none();
        }
    }
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Fetch the record for `id`.
    async fn get(&self, id: &FeedId) -> Result<Option<InviteRecord>, StoreError>;

    /// Write `record` under `id`, replacing any existing record.
    async fn put(&self, id: &FeedId, record: &InviteRecord) -> Result<(), StoreError>;

    /// Write `record` only if the stored copy still has `expected_used`
    /// redemptions. Returns `false` without writing otherwise.
    async fn put_if_unchanged(
        &self,
        record: &InviteRecord,
        expected_used: u32,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S: InviteStore + ?Sized> GrantLookup for S {
    async fn lookup(&self, id: &FeedId) -> Option<InviteGrant> {
        match self.get(id).await {
            Ok(record) => record.map(|record| InviteGrant {
                exhausted: record.is_exhausted(),
                permissions: record.permissions,
            }),
            Err(e) => {
                debug!(peer = %id, error = %e, "invite lookup failed");
                None
            }
        }
    }
}
