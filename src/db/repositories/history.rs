use crate::domain::EngineId;
use crate::entities::{history, prelude::*};
use crate::models::HistoryEntry;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::warn;

pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the entry, or moves an existing `(engine, query)` row to the new time.
    pub async fn upsert(&self, entry: &HistoryEntry) -> Result<()> {
        let active_model = history::ActiveModel {
            engine_id: Set(entry.engine_id.to_string()),
            query: Set(entry.query.clone()),
            time: Set(entry.time),
        };

        History::insert(active_model)
            .on_conflict(
                OnConflict::columns([history::Column::EngineId, history::Column::Query])
                    .update_column(history::Column::Time)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, engine_id: EngineId, query: &str) -> Result<bool> {
        let result = History::delete_by_id((engine_id.to_string(), query.to_string()))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<HistoryEntry>> {
        let rows = History::find()
            .order_by_desc(history::Column::Time)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().filter_map(to_entry).collect())
    }

    pub async fn list_by_engine(&self, engine_id: EngineId) -> Result<Vec<HistoryEntry>> {
        let rows = History::find()
            .filter(history::Column::EngineId.eq(engine_id.to_string()))
            .order_by_desc(history::Column::Time)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().filter_map(to_entry).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(History::find().count(&self.conn).await?)
    }

    pub async fn count_by_engine(&self, engine_id: EngineId) -> Result<u64> {
        let count = History::find()
            .filter(history::Column::EngineId.eq(engine_id.to_string()))
            .count(&self.conn)
            .await?;

        Ok(count)
    }

    pub async fn oldest_for_engine(
        &self,
        engine_id: EngineId,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>> {
        let rows = History::find()
            .filter(history::Column::EngineId.eq(engine_id.to_string()))
            .order_by_asc(history::Column::Time)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().filter_map(to_entry).collect())
    }
}

fn to_entry(model: history::Model) -> Option<HistoryEntry> {
    match model.engine_id.parse::<EngineId>() {
        Ok(engine_id) => Some(HistoryEntry::new(engine_id, model.query, model.time)),
        Err(e) => {
            warn!(
                engine_id = %model.engine_id,
                error = %e,
                "Skipping history row with invalid engine id"
            );
            None
        }
    }
}
