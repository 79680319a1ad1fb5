//! Domain service for the search history.
//!
//! The store is the single source of truth for submitted searches. Readers that
//! need to stay current subscribe to [`HistoryStore::changes`] or use
//! [`observe`], which re-queries after every write.

use crate::domain::EngineId;
use crate::models::HistoryEntry;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

/// Errors specific to history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for HistoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for HistoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Which part of the history a reader is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    All,
    Engine(EngineId),
}

/// Persistent set of [`HistoryEntry`] keyed by `(engine_id, query)`.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Stores `entry`, replacing the time of an existing `(engine, query)` row.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] if the write fails.
    async fn insert_or_replace(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Removes the row with the entry's key. Returns whether a row was removed.
    async fn delete(&self, entry: &HistoryEntry) -> Result<bool, HistoryError>;

    /// All entries, newest first.
    async fn list_all(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Entries of one engine, newest first.
    async fn list_by_engine(&self, engine_id: EngineId) -> Result<Vec<HistoryEntry>, HistoryError>;

    async fn count(&self) -> Result<u64, HistoryError>;

    async fn count_by_engine(&self, engine_id: EngineId) -> Result<u64, HistoryError>;

    /// Up to `limit` entries of one engine, oldest first.
    async fn oldest_for_engine(
        &self,
        engine_id: EngineId,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Revision counter bumped after every successful write.
    fn changes(&self) -> watch::Receiver<u64>;

    async fn list(&self, scope: HistoryScope) -> Result<Vec<HistoryEntry>, HistoryError> {
        match scope {
            HistoryScope::All => self.list_all().await,
            HistoryScope::Engine(engine_id) => self.list_by_engine(engine_id).await,
        }
    }
}

/// Live view of the history: yields the current list, then a fresh list after
/// every change to the store. Ends when the store stops publishing changes.
///
/// Failed queries are logged and skipped rather than emitted as an empty list.
pub fn observe(
    store: Arc<dyn HistoryStore>,
    scope: HistoryScope,
) -> BoxStream<'static, Vec<HistoryEntry>> {
    let changes = store.changes();

    stream::unfold(
        (store, changes, true),
        move |(store, mut changes, first)| async move {
            if !first && changes.changed().await.is_err() {
                return None;
            }
            changes.borrow_and_update();

            let entries = match store.list(scope).await {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!(error = %e, ?scope, "Failed to query history");
                    None
                }
            };
            Some((entries, (store, changes, false)))
        },
    )
    .filter_map(|entries| async move { entries })
    .boxed()
}
