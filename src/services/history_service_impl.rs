//! `SeaORM` and in-memory implementations of the `HistoryStore` trait.

use crate::db::Store;
use crate::domain::EngineId;
use crate::models::HistoryEntry;
use crate::services::history_service::{HistoryError, HistoryStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::{RwLock, watch};

fn revision_channel() -> watch::Sender<u64> {
    watch::Sender::new(0)
}

fn bump(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r = r.wrapping_add(1));
}

/// History backed by the `history` table.
pub struct SeaOrmHistoryStore {
    store: Store,
    revision: watch::Sender<u64>,
}

impl SeaOrmHistoryStore {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            revision: revision_channel(),
        }
    }
}

#[async_trait]
impl HistoryStore for SeaOrmHistoryStore {
    async fn insert_or_replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.store.upsert_history(&entry).await?;
        bump(&self.revision);
        Ok(())
    }

    async fn delete(&self, entry: &HistoryEntry) -> Result<bool, HistoryError> {
        let removed = self
            .store
            .delete_history(entry.engine_id, &entry.query)
            .await?;
        if removed {
            bump(&self.revision);
        }
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.store.list_history().await?)
    }

    async fn list_by_engine(&self, engine_id: EngineId) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.store.list_history_for_engine(engine_id).await?)
    }

    async fn count(&self) -> Result<u64, HistoryError> {
        Ok(self.store.count_history().await?)
    }

    async fn count_by_engine(&self, engine_id: EngineId) -> Result<u64, HistoryError> {
        Ok(self.store.count_history_for_engine(engine_id).await?)
    }

    async fn oldest_for_engine(
        &self,
        engine_id: EngineId,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .store
            .oldest_history_for_engine(engine_id, limit)
            .await?)
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

/// History kept in process memory. Used by tests and `--ephemeral` runs.
pub struct MemoryHistoryStore {
    entries: RwLock<BTreeMap<(EngineId, String), i64>>,
    revision: watch::Sender<u64>,
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            revision: revision_channel(),
        }
    }

    async fn collect<F>(&self, keep: F) -> Vec<HistoryEntry>
    where
        F: Fn(EngineId) -> bool + Send,
    {
        let entries = self.entries.read().await;
        let mut list: Vec<HistoryEntry> = entries
            .iter()
            .filter(|((engine_id, _), _)| keep(*engine_id))
            .map(|((engine_id, query), time)| HistoryEntry::new(*engine_id, query.clone(), *time))
            .collect();
        list.sort_by(|a, b| b.time.cmp(&a.time));
        list
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert_or_replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.entries
            .write()
            .await
            .insert((entry.engine_id, entry.query), entry.time);
        bump(&self.revision);
        Ok(())
    }

    async fn delete(&self, entry: &HistoryEntry) -> Result<bool, HistoryError> {
        let removed = self
            .entries
            .write()
            .await
            .remove(&(entry.engine_id, entry.query.clone()))
            .is_some();
        if removed {
            bump(&self.revision);
        }
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.collect(|_| true).await)
    }

    async fn list_by_engine(&self, engine_id: EngineId) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.collect(|id| id == engine_id).await)
    }

    async fn count(&self) -> Result<u64, HistoryError> {
        Ok(self.entries.read().await.len() as u64)
    }

    async fn count_by_engine(&self, engine_id: EngineId) -> Result<u64, HistoryError> {
        let entries = self.entries.read().await;
        Ok(entries.keys().filter(|(id, _)| *id == engine_id).count() as u64)
    }

    async fn oldest_for_engine(
        &self,
        engine_id: EngineId,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut list = self.collect(|id| id == engine_id).await;
        list.reverse();
        list.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(list)
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
