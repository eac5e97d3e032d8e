//! In-memory invite store.
//!
//! Used by tests and by nodes that do not need invites to survive a restart.

use super::{InviteRecord, InviteStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use peerinvite_proto::FeedId;

#[derive(Default)]
pub struct MemoryInviteStore {
    records: DashMap<FeedId, InviteRecord>,
}

impl MemoryInviteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl InviteStore for MemoryInviteStore {
    async fn get(&self, id: &FeedId) -> Result<Option<InviteRecord>, StoreError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn put(&self, id: &FeedId, record: &InviteRecord) -> Result<(), StoreError> {
        self.records.insert(id.clone(), record.clone());
        Ok(())
    }

    async fn put_if_unchanged(
        &self,
        record: &InviteRecord,
        expected_used: u32,
    ) -> Result<bool, StoreError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(mut current) if current.get().used == expected_used => {
                current.insert(record.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
