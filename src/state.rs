use std::sync::Arc;

use crate::clients::SuggestionClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::EngineId;
use crate::models::EngineCatalog;
use crate::services::navigation::Navigator;
use crate::services::{
    HistoryStore, MemoryHistoryStore, RetentionPolicy, SeaOrmHistoryStore, SessionServices,
    SettingsStore,
};

/// Build a shared HTTP client for suggestion requests.
/// Reused across sessions so connections to an engine stay pooled.
pub fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.suggestions.request_timeout())
        .user_agent(config.suggestions.user_agent.as_str())
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub catalog: Arc<EngineCatalog>,

    pub settings: Arc<SettingsStore>,

    pub history: Arc<dyn HistoryStore>,

    pub suggestions: Arc<SuggestionClient>,

    pub retention: RetentionPolicy,
}

impl SharedState {
    /// State backed by the configured database and settings file.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let catalog = EngineCatalog::shared();
        let settings = SettingsStore::load(&config.general.settings_path, catalog.clone());
        let history: Arc<dyn HistoryStore> = Arc::new(SeaOrmHistoryStore::new(store));

        Self::assemble(config, catalog, settings, history)
    }

    /// State that keeps history and settings in memory only.
    pub fn ephemeral(config: Config) -> anyhow::Result<Self> {
        let catalog = EngineCatalog::shared();
        let settings = SettingsStore::in_memory(catalog.clone());
        let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());

        Self::assemble(config, catalog, settings, history)
    }

    fn assemble(
        config: Config,
        catalog: Arc<EngineCatalog>,
        settings: SettingsStore,
        history: Arc<dyn HistoryStore>,
    ) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(&config)?;
        let suggestions = Arc::new(SuggestionClient::with_shared_client(http_client));
        let retention =
            RetentionPolicy::new(config.history.max_entries, config.history.eviction_batch);

        Ok(Self {
            config: Arc::new(config),
            catalog,
            settings: Arc::new(settings),
            history,
            suggestions,
            retention,
        })
    }

    /// Resolves a user-supplied engine name or id.
    pub fn engine_by_name(&self, name: &str) -> anyhow::Result<EngineId> {
        self.catalog
            .find(name)
            .map(|engine| engine.id)
            .ok_or_else(|| anyhow::anyhow!("Unknown search engine: {name}"))
    }

    /// Collaborators for a search session.
    ///
    /// With `engine_override`, the session works on an unsaved copy of the
    /// settings that uses that engine; nothing it changes is persisted.
    pub fn session_services(
        &self,
        navigator: Arc<dyn Navigator>,
        engine_override: Option<EngineId>,
    ) -> anyhow::Result<SessionServices> {
        let settings = match engine_override {
            None => self.settings.clone(),
            Some(engine_id) => {
                let scratch =
                    SettingsStore::with_settings(self.settings.current(), self.catalog.clone());
                scratch.set_search_engine(engine_id)?;
                Arc::new(scratch)
            }
        };

        Ok(SessionServices {
            catalog: self.catalog.clone(),
            settings,
            history: self.history.clone(),
            suggestions: self.suggestions.clone(),
            navigator,
        })
    }

    /// Runs a single retention pass, for commands that exit right away.
    pub async fn enforce_retention(&self) -> anyhow::Result<()> {
        self.retention
            .enforce(self.history.as_ref(), &self.catalog)
            .await?;
        Ok(())
    }
}
