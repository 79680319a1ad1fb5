use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::APP_NAME;
use crate::constants::history::{EVICTION_BATCH, MAX_ENTRIES};
use crate::constants::intervals::SUGGESTION_DEBOUNCE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub suggestions: SuggestionsConfig,

    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    /// Where user preferences are persisted.
    pub settings_path: String,

    pub log_level: String,

    pub log_format: LogFormat,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/bettersearch.db".to_string(),
            settings_path: "data/settings.toml".to_string(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Quiet period after the last keystroke before fetching (default: 100)
    pub debounce_ms: u64,

    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    /// User agent for suggestion requests. Startpage always gets a browser one.
    pub user_agent: String,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            debounce_ms: u64::try_from(SUGGESTION_DEBOUNCE.as_millis()).unwrap_or(100),
            request_timeout_seconds: 10,
            user_agent: format!("BetterSearch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SuggestionsConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entry count above which the oldest searches are evicted (default: 10000)
    pub max_entries: u64,

    /// Entries removed per eviction pass (default: 10)
    pub eviction_batch: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            eviction_batch: EVICTION_BATCH,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_NAME).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}")).join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.general.max_db_connections == 0 {
            anyhow::bail!("max_db_connections must be > 0");
        }

        if self.suggestions.request_timeout_seconds == 0 {
            anyhow::bail!("Suggestion request timeout must be > 0");
        }

        if self.history.max_entries == 0 || self.history.eviction_batch == 0 {
            anyhow::bail!("History max_entries and eviction_batch must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.suggestions.debounce_ms, 100);
        assert_eq!(config.history.max_entries, 10_000);
        assert_eq!(config.history.eviction_batch, 10);
        assert_eq!(config.general.log_format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[suggestions]"));
        assert!(toml_str.contains("[history]"));
        assert!(toml_str.contains("log_format = \"text\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"
            log_format = "json"

            [history]
            max_entries = 500
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, LogFormat::Json);
        assert_eq!(config.history.max_entries, 500);

        assert_eq!(config.history.eviction_batch, 10);
        assert_eq!(config.suggestions.request_timeout_seconds, 10);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.history.eviction_batch = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.suggestions.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("bettersearch-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let mut config = Config::default();
        config.suggestions.debounce_ms = 250;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.suggestions.debounce(), Duration::from_millis(250));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
