//! Redb-backed invite store.
//!
//! # Schema
//!
//! ```text
//! INVITES: feed id -> InviteRecord (serde_json)
//! ```

use super::{InviteRecord, InviteStore, StoreError};
use async_trait::async_trait;
use peerinvite_proto::FeedId;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Redb table holding invite records.
const INVITES: TableDefinition<&str, &[u8]> = TableDefinition::new("invites");

pub struct RedbInviteStore {
    db: Arc<Database>,
}

impl RedbInviteStore {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = Database::create(path)?;
        info!(path = %path.display(), "Invite store opened");
        Self::new(Arc::new(db))
    }

    /// Use an existing Redb database shared with other stores.
    pub fn new(db: Arc<Database>) -> Result<Self, StoreError> {
        // Ensure the table exists so readers never see TableDoesNotExist.
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(INVITES)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }
}

#[async_trait]
impl InviteStore for RedbInviteStore {
    async fn get(&self, id: &FeedId) -> Result<Option<InviteRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVITES)?;
        let record = match table.get(id.as_str())? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(record)
    }

    async fn put(&self, id: &FeedId, record: &InviteRecord) -> Result<(), StoreError> {
        let value = serde_json::to_vec(record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(INVITES)?;
            table.insert(id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        debug!(invite = %id, used = record.used, total = record.total, "Stored invite");
        Ok(())
    }

    async fn put_if_unchanged(
        &self,
        record: &InviteRecord,
        expected_used: u32,
    ) -> Result<bool, StoreError> {
        let value = serde_json::to_vec(record)?;
        let key = record.id.as_str();
        let write_txn = self.db.begin_write()?;
        let written = {
            let mut table = write_txn.open_table(INVITES)?;
            let current: Option<InviteRecord> = match table.get(key)? {
                Some(stored) => Some(serde_json::from_slice(stored.value())?),
                None => None,
            };
            match current {
                Some(current) if current.used == expected_used => {
                    table.insert(key, value.as_slice())?;
                    true
                }
                _ => false,
            }
        };
        if written {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;
    use tempfile::tempdir;

    fn create_test_store() -> (RedbInviteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = RedbInviteStore::open(dir.path().join("invites.redb")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _dir) = create_test_store();
        let id = Keypair::generate().id().clone();
        assert!(store.get(&id).await.unwrap().is_none());

        let record = InviteRecord::new(id.clone(), 2, Some("for alice".into()));
        store.put(&id, &record).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invites.redb");
        let id = Keypair::generate().id().clone();
        {
            let store = RedbInviteStore::open(&path).unwrap();
            store
                .put(&id, &InviteRecord::new(id.clone(), 1, None))
                .await
                .unwrap();
        }
        let store = RedbInviteStore::open(&path).unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_compare_and_put() {
        let (store, _dir) = create_test_store();
        let id = Keypair::generate().id().clone();
        let record = InviteRecord::new(id.clone(), 2, None);
        store.put(&id, &record).await.unwrap();

        let mut next = record.clone();
        next.redeem();
        assert!(store.put_if_unchanged(&next, 0).await.unwrap());
        assert!(!store.put_if_unchanged(&next, 0).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap().unwrap().used, 1);
    }
}
