use crate::domain::EngineId;
use crate::models::HistoryEntry;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::history::HistoryRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database sees its own empty
        // database, so those get exactly one connection that never expires.
        let in_memory = db_url.contains(":memory:");
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// In-process database, gone when the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1).await
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn history_repo(&self) -> HistoryRepository {
        HistoryRepository::new(self.conn.clone())
    }

    pub async fn upsert_history(&self, entry: &HistoryEntry) -> Result<()> {
        self.history_repo().upsert(entry).await
    }

    pub async fn delete_history(&self, engine_id: EngineId, query: &str) -> Result<bool> {
        self.history_repo().delete(engine_id, query).await
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        self.history_repo().list_all().await
    }

    pub async fn list_history_for_engine(
        &self,
        engine_id: EngineId,
    ) -> Result<Vec<HistoryEntry>> {
        self.history_repo().list_by_engine(engine_id).await
    }

    pub async fn count_history(&self) -> Result<u64> {
        self.history_repo().count().await
    }

    pub async fn count_history_for_engine(&self, engine_id: EngineId) -> Result<u64> {
        self.history_repo().count_by_engine(engine_id).await
    }

    pub async fn oldest_history_for_engine(
        &self,
        engine_id: EngineId,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>> {
        self.history_repo()
            .oldest_for_engine(engine_id, limit)
            .await
    }
}
