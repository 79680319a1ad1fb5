//! Keeps the history table bounded.
//!
//! Eviction is deliberately coarse: whenever the table holds more than
//! `max_entries` rows, the engine with the most rows loses its `batch` oldest
//! entries. Each store change re-triggers the check, so repeated passes
//! converge below the cap.

use crate::constants::history::{EVICTION_BATCH, MAX_ENTRIES};
use crate::domain::EngineId;
use crate::models::EngineCatalog;
use crate::services::history_service::{HistoryError, HistoryStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_entries: u64,
    pub batch: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(MAX_ENTRIES, EVICTION_BATCH)
    }
}

/// What a single eviction pass removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionOutcome {
    pub engine_id: EngineId,
    pub total_before: u64,
    pub removed: u64,
}

impl RetentionPolicy {
    #[must_use]
    pub const fn new(max_entries: u64, batch: u64) -> Self {
        Self { max_entries, batch }
    }

    /// Runs one eviction pass. Returns `None` when the store is within bounds.
    pub async fn enforce(
        &self,
        store: &dyn HistoryStore,
        catalog: &EngineCatalog,
    ) -> Result<Option<RetentionOutcome>, HistoryError> {
        let total = store.count().await?;
        if total <= self.max_entries {
            return Ok(None);
        }

        let mut counts = Vec::with_capacity(catalog.len());
        for engine in catalog.iter() {
            counts.push((engine.id, store.count_by_engine(engine.id).await?));
        }

        let Some(engine_id) = select_engine(&counts) else {
            warn!(total, "History over capacity but no catalog engine owns any entry");
            return Ok(None);
        };

        let mut removed = 0;
        for entry in store.oldest_for_engine(engine_id, self.batch).await? {
            if store.delete(&entry).await? {
                removed += 1;
            }
        }

        info!(
            engine_id = %engine_id,
            total_before = total,
            removed,
            "Evicted oldest history entries"
        );

        Ok(Some(RetentionOutcome {
            engine_id,
            total_before: total,
            removed,
        }))
    }

    /// Enforces the policy now and after every store change until `cancel` fires.
    pub fn spawn_watcher(
        self,
        store: Arc<dyn HistoryStore>,
        catalog: Arc<EngineCatalog>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut changes = store.changes();

            loop {
                changes.borrow_and_update();

                match self.enforce(store.as_ref(), &catalog).await {
                    Ok(Some(outcome)) => debug!(?outcome, "Retention pass finished"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Retention pass failed"),
                }

                tokio::select! {
                    () = cancel.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            debug!("Retention watcher stopped");
        })
    }
}

/// Engine with the most entries; the first one in catalog order wins a tie.
#[must_use]
pub fn select_engine(counts: &[(EngineId, u64)]) -> Option<EngineId> {
    let mut best: Option<(EngineId, u64)> = None;
    for &(engine_id, count) in counts {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((engine_id, count));
        }
    }
    best.map(|(engine_id, _)| engine_id)
}
