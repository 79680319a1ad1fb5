//! User preferences.
//!
//! Settings are a handful of independent scalars. Reads go through a `watch`
//! channel so every consumer sees changes as they happen; writes are validated
//! before the state changes and persisted to a TOML file in the background.

use crate::domain::{EngineId, InvalidTheme, Theme};
use crate::models::EngineCatalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod keys {
    pub const THEME: &str = "theme";
    pub const DYNAMIC_COLORS: &str = "dynamic_colors";
    pub const SEARCH_ENGINE: &str = "search_engine";
    pub const SHOW_PILLS: &str = "show_pills";
    pub const PILLS_ENGINES: &str = "pills_engines";
    pub const SUGGEST_HISTORY: &str = "suggest_history";
    pub const SUGGEST_HISTORY_ALL_ENGINES: &str = "suggest_history_all_engines";
    pub const INTRO_DONE: &str = "intro_done";

    pub const ALL: [&str; 8] = [
        THEME,
        DYNAMIC_COLORS,
        SEARCH_ENGINE,
        SHOW_PILLS,
        PILLS_ENGINES,
        SUGGEST_HISTORY,
        SUGGEST_HISTORY_ALL_ENGINES,
        INTRO_DONE,
    ];
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    InvalidTheme(#[from] InvalidTheme),

    #[error("Unknown search engine: {0}")]
    UnknownEngine(String),

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to persist settings: {0}")]
    Persist(String),
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Persist(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub dynamic_colors: bool,
    pub search_engine: EngineId,
    pub show_pills: bool,
    pub pills_engines: Vec<EngineId>,
    pub suggest_history: bool,
    pub suggest_history_all_engines: bool,
    pub intro_done: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            dynamic_colors: true,
            search_engine: EngineId::from_index(0),
            show_pills: true,
            pills_engines: (0..3).map(EngineId::from_index).collect(),
            suggest_history: true,
            suggest_history_all_engines: true,
            intro_done: true,
        }
    }
}

impl Settings {
    /// Reads settings from a TOML table. Missing keys take their default; keys
    /// with an unusable value take their default and are reported.
    #[must_use]
    pub fn from_table(table: &toml::Table, catalog: &EngineCatalog) -> Self {
        let defaults = Self::default();

        let pills_engines = table.get(keys::PILLS_ENGINES).map_or_else(
            || defaults.pills_engines.clone(),
            |value| {
                value.as_array().map_or_else(
                    || {
                        warn!(key = keys::PILLS_ENGINES, "Ignoring invalid setting value");
                        defaults.pills_engines.clone()
                    },
                    |items| {
                        let ids = items.iter().filter_map(|item| {
                            let id = item.as_str().and_then(|s| s.parse::<EngineId>().ok());
                            match id {
                                Some(id) if catalog.contains(id) => Some(id),
                                _ => {
                                    warn!(value = %item, "Dropping unknown pill engine");
                                    None
                                }
                            }
                        });
                        dedup_preserving_order(ids)
                    },
                )
            },
        );

        Self {
            theme: read(table, keys::THEME, defaults.theme, |v| {
                v.as_integer().and_then(|i| Theme::try_from(i).ok())
            }),
            dynamic_colors: read_bool(table, keys::DYNAMIC_COLORS, defaults.dynamic_colors),
            search_engine: read(table, keys::SEARCH_ENGINE, defaults.search_engine, |v| {
                v.as_str()
                    .and_then(|s| s.parse::<EngineId>().ok())
                    .filter(|id| catalog.contains(*id))
            }),
            show_pills: read_bool(table, keys::SHOW_PILLS, defaults.show_pills),
            pills_engines,
            suggest_history: read_bool(table, keys::SUGGEST_HISTORY, defaults.suggest_history),
            suggest_history_all_engines: read_bool(
                table,
                keys::SUGGEST_HISTORY_ALL_ENGINES,
                defaults.suggest_history_all_engines,
            ),
            intro_done: read_bool(table, keys::INTRO_DONE, defaults.intro_done),
        }
    }

    #[must_use]
    pub fn to_table(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert(keys::THEME.into(), toml::Value::Integer(self.theme.index()));
        table.insert(keys::DYNAMIC_COLORS.into(), self.dynamic_colors.into());
        table.insert(
            keys::SEARCH_ENGINE.into(),
            self.search_engine.to_string().into(),
        );
        table.insert(keys::SHOW_PILLS.into(), self.show_pills.into());
        table.insert(
            keys::PILLS_ENGINES.into(),
            toml::Value::Array(
                self.pills_engines
                    .iter()
                    .map(|id| id.to_string().into())
                    .collect(),
            ),
        );
        table.insert(keys::SUGGEST_HISTORY.into(), self.suggest_history.into());
        table.insert(
            keys::SUGGEST_HISTORY_ALL_ENGINES.into(),
            self.suggest_history_all_engines.into(),
        );
        table.insert(keys::INTRO_DONE.into(), self.intro_done.into());
        table
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(&self.to_table()).map_err(|e| SettingsError::Persist(e.to_string()))
    }
}

fn read<T>(
    table: &toml::Table,
    key: &str,
    default: T,
    parse: impl FnOnce(&toml::Value) -> Option<T>,
) -> T {
    match table.get(key) {
        None => default,
        Some(value) => parse(value).unwrap_or_else(|| {
            warn!(key, %value, "Ignoring invalid setting value");
            default
        }),
    }
}

fn read_bool(table: &toml::Table, key: &str, default: bool) -> bool {
    read(table, key, default, toml::Value::as_bool)
}

fn dedup_preserving_order(ids: impl IntoIterator<Item = EngineId>) -> Vec<EngineId> {
    let mut out: Vec<EngineId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Reactive settings with optional file persistence.
pub struct SettingsStore {
    path: Option<PathBuf>,
    catalog: Arc<EngineCatalog>,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: impl Into<PathBuf>, catalog: Arc<EngineCatalog>) -> Self {
        let path = path.into();
        let settings = Self::read_file(&path, &catalog);
        Self {
            path: Some(path),
            catalog,
            tx: watch::Sender::new(settings),
        }
    }

    /// Settings that live only as long as this value.
    #[must_use]
    pub fn in_memory(catalog: Arc<EngineCatalog>) -> Self {
        Self::with_settings(Settings::default(), catalog)
    }

    #[must_use]
    pub fn with_settings(settings: Settings, catalog: Arc<EngineCatalog>) -> Self {
        Self {
            path: None,
            catalog,
            tx: watch::Sender::new(settings),
        }
    }

    fn read_file(path: &Path, catalog: &EngineCatalog) -> Settings {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                return Settings::default();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read settings from {}", path.display());
                return Settings::default();
            }
        };

        match content.parse::<toml::Table>() {
            Ok(table) => Settings::from_table(&table, catalog),
            Err(e) => {
                warn!(error = %e, "Failed to parse settings from {}", path.display());
                Settings::default()
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut Settings)) {
        self.tx.send_if_modified(|settings| {
            let before = settings.clone();
            apply(settings);
            *settings != before
        });
    }

    fn known_engine(&self, id: EngineId) -> Result<EngineId, SettingsError> {
        if self.catalog.contains(id) {
            Ok(id)
        } else {
            Err(SettingsError::UnknownEngine(id.to_string()))
        }
    }

    fn engine_by_name(&self, needle: &str) -> Result<EngineId, SettingsError> {
        self.catalog
            .find(needle.trim())
            .map(|engine| engine.id)
            .ok_or_else(|| SettingsError::UnknownEngine(needle.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidTheme`] for values outside `0..=2`;
    /// the stored theme is left untouched.
    pub fn set_theme(&self, value: i64) -> Result<(), SettingsError> {
        let theme = Theme::try_from(value)?;
        self.update(|s| s.theme = theme);
        Ok(())
    }

    pub fn set_dynamic_colors(&self, enabled: bool) {
        self.update(|s| s.dynamic_colors = enabled);
    }

    pub fn set_search_engine(&self, id: EngineId) -> Result<(), SettingsError> {
        let id = self.known_engine(id)?;
        self.update(|s| s.search_engine = id);
        Ok(())
    }

    pub fn set_show_pills(&self, enabled: bool) {
        self.update(|s| s.show_pills = enabled);
    }

    /// Replaces the pill list. Duplicates are dropped, keeping the first position.
    pub fn set_pill_engines(&self, ids: Vec<EngineId>) -> Result<(), SettingsError> {
        let ids = ids
            .into_iter()
            .map(|id| self.known_engine(id))
            .collect::<Result<Vec<_>, _>>()?;
        let ids = dedup_preserving_order(ids);
        self.update(|s| s.pills_engines = ids);
        Ok(())
    }

    pub fn set_suggest_history(&self, enabled: bool) {
        self.update(|s| s.suggest_history = enabled);
    }

    pub fn set_suggest_history_all_engines(&self, enabled: bool) {
        self.update(|s| s.suggest_history_all_engines = enabled);
    }

    pub fn set_intro_done(&self, done: bool) {
        self.update(|s| s.intro_done = done);
    }

    /// Sets a key from its textual form, as typed on the command line.
    ///
    /// Engines are given by name or id; the pill list is comma-separated;
    /// the theme accepts its index or `auto`/`light`/`dark`.
    pub fn set_from_str(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            keys::THEME => {
                let index = match value.trim().to_ascii_lowercase().as_str() {
                    "auto" => Theme::Auto.index(),
                    "light" => Theme::Light.index(),
                    "dark" => Theme::Dark.index(),
                    other => other.parse().map_err(|_| SettingsError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?,
                };
                self.set_theme(index)
            }
            keys::DYNAMIC_COLORS => {
                self.set_dynamic_colors(parse_bool(key, value)?);
                Ok(())
            }
            keys::SEARCH_ENGINE => self.set_search_engine(self.engine_by_name(value)?),
            keys::SHOW_PILLS => {
                self.set_show_pills(parse_bool(key, value)?);
                Ok(())
            }
            keys::PILLS_ENGINES => {
                let ids = value
                    .split(',')
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| self.engine_by_name(name))
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_pill_engines(ids)
            }
            keys::SUGGEST_HISTORY => {
                self.set_suggest_history(parse_bool(key, value)?);
                Ok(())
            }
            keys::SUGGEST_HISTORY_ALL_ENGINES => {
                self.set_suggest_history_all_engines(parse_bool(key, value)?);
                Ok(())
            }
            keys::INTRO_DONE => {
                self.set_intro_done(parse_bool(key, value)?);
                Ok(())
            }
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }

    /// Writes the current snapshot to disk now. No-op for in-memory settings.
    pub async fn flush(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_snapshot(path, &self.current()).await
    }

    /// Persists the current snapshot, then every change, in the background
    /// until `cancel` fires.
    ///
    /// Write failures are logged and do not stop the task. Returns `None` for
    /// in-memory settings.
    #[must_use]
    pub fn spawn_persister(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let path = self.path.clone()?;
        let mut rx = self.tx.subscribe();
        // changes made before the task started still have to reach the file
        rx.mark_changed();

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        if rx.has_changed().unwrap_or(false) {
                            let snapshot = rx.borrow_and_update().clone();
                            persist_logged(&path, &snapshot).await;
                        }
                        break;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = rx.borrow_and_update().clone();
                        persist_logged(&path, &snapshot).await;
                    }
                }
            }
        }))
    }
}

async fn write_snapshot(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, settings.to_toml_string()?).await?;
    debug!("Settings saved to: {}", path.display());
    Ok(())
}

async fn persist_logged(path: &Path, settings: &Settings) {
    if let Err(e) = write_snapshot(path, settings).await {
        warn!(error = %e, "Failed to persist settings");
    }
}

/// Writes default settings to `path` unless a file is already there.
pub fn create_default_if_missing(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Settings::default().to_toml_string()?)?;
    info!("Created default settings file: {}", path.display());
    Ok(true)
}
