//! Runtime of the search screen.
//!
//! A [`SearchSession`] owns the current query and keeps a [`SuggestionView`]
//! up to date: one task recomputes the history section whenever the query,
//! the settings or the stored history change, another debounces the query and
//! fetches live suggestions for the active engine. Each task is the only
//! writer of its half of the view.
//!
//! A live fetch is dropped as soon as the query or the engine changes, and a
//! result is only published while its `(query, engine)` still matches the
//! input, so a slow response can never overwrite a newer one.

use crate::clients::SuggestionSource;
use crate::constants::intervals::SUGGESTION_DEBOUNCE;
use crate::domain::EngineId;
use crate::models::{EngineCatalog, HistoryEntry, SearchEngine};
use crate::services::blend::history_suggestions;
use crate::services::history_service::{HistoryError, HistoryScope, HistoryStore, observe};
use crate::services::navigation::{NavigationError, Navigator};
use crate::services::settings::{Settings, SettingsError, SettingsStore};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// What the search screen shows below the query box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionView {
    pub query: String,
    pub history: Vec<HistoryEntry>,
    pub live: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionRow<'a> {
    History(&'a HistoryEntry),
    Live(&'a str),
}

impl SuggestionRow<'_> {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::History(entry) => &entry.query,
            Self::Live(text) => text,
        }
    }
}

impl SuggestionView {
    /// History rows first, then live rows. The two sections are not deduplicated.
    #[must_use]
    pub fn rows(&self) -> Vec<SuggestionRow<'_>> {
        self.history
            .iter()
            .map(SuggestionRow::History)
            .chain(self.live.iter().map(|s| SuggestionRow::Live(s.as_str())))
            .collect()
    }
}

/// Collaborators a session works with.
#[derive(Clone)]
pub struct SessionServices {
    pub catalog: Arc<EngineCatalog>,
    pub settings: Arc<SettingsStore>,
    pub history: Arc<dyn HistoryStore>,
    pub suggestions: Arc<dyn SuggestionSource>,
    pub navigator: Arc<dyn Navigator>,
}

struct Shared {
    services: SessionServices,
    query: watch::Sender<String>,
    view: watch::Sender<SuggestionView>,
    debounce: Duration,
    cancel: CancellationToken,
}

fn history_scope(settings: &Settings) -> HistoryScope {
    if settings.suggest_history_all_engines {
        HistoryScope::All
    } else {
        HistoryScope::Engine(settings.search_engine)
    }
}

impl Shared {
    fn publish_live(&self, query: &str, engine_id: EngineId, live: Vec<String>) {
        if self.cancel.is_cancelled() {
            return;
        }
        if *self.query.borrow() != query
            || self.services.settings.current().search_engine != engine_id
        {
            debug!(query, "Discarding stale suggestions");
            return;
        }
        self.view.send_modify(|view| view.live = live);
    }

    async fn run_live(self: Arc<Self>) {
        let mut query_rx = self.query.subscribe();
        let mut settings_rx = self.services.settings.subscribe();

        loop {
            let query = query_rx.borrow_and_update().clone();
            let engine_id = settings_rx.borrow_and_update().search_engine;

            if query.trim().is_empty() {
                self.publish_live(&query, engine_id, Vec::new());
            } else {
                let engine = self.services.catalog.resolve(engine_id).clone();
                let fetch = async {
                    tokio::time::sleep(self.debounce).await;
                    self.services
                        .suggestions
                        .fetch_suggestions(&query, &engine)
                        .await
                };
                tokio::pin!(fetch);

                let live = loop {
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return,
                        changed = query_rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            break None;
                        }
                        changed = settings_rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            if settings_rx.borrow().search_engine != engine_id {
                                break None;
                            }
                        }
                        live = &mut fetch => break Some(live),
                    }
                };

                match live {
                    Some(live) => self.publish_live(&query, engine_id, live),
                    None => {
                        debug!(query, "Input changed, dropping pending fetch");
                        continue;
                    }
                }
            }

            loop {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return,
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        break;
                    }
                    changed = settings_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if settings_rx.borrow().search_engine != engine_id {
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn run_history(self: Arc<Self>) {
        let mut query_rx = self.query.subscribe();
        let mut settings_rx = self.services.settings.subscribe();
        let mut entries: Vec<HistoryEntry> = Vec::new();

        loop {
            let scope = history_scope(&settings_rx.borrow_and_update());
            let mut stream = observe(self.services.history.clone(), scope);

            loop {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return,
                    next = stream.next() => match next {
                        Some(list) => entries = list,
                        None => return,
                    },
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    changed = settings_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if history_scope(&settings_rx.borrow()) != scope {
                            break;
                        }
                    }
                }

                let query = query_rx.borrow_and_update().clone();
                let enabled = settings_rx.borrow().suggest_history;
                let shown = history_suggestions(&entries, &query, enabled);
                if !self.cancel.is_cancelled() {
                    self.view.send_modify(|view| view.history = shown);
                }
            }
        }
    }
}

/// A live search screen. Dropping it stops all of its background work.
pub struct SearchSession {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl SearchSession {
    /// Starts a session with the default debounce. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(services: SessionServices, initial_query: &str) -> Self {
        Self::with_debounce(services, initial_query, SUGGESTION_DEBOUNCE)
    }

    #[must_use]
    pub fn with_debounce(
        services: SessionServices,
        initial_query: &str,
        debounce: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            services,
            query: watch::Sender::new(initial_query.to_string()),
            view: watch::Sender::new(SuggestionView {
                query: initial_query.to_string(),
                ..SuggestionView::default()
            }),
            debounce,
            cancel: CancellationToken::new(),
        });

        let tasks = vec![
            tokio::spawn(shared.clone().run_live()),
            tokio::spawn(shared.clone().run_history()),
        ];

        Self { shared, tasks }
    }

    /// Replaces the query text. Returns immediately; the view follows.
    pub fn set_query(&self, text: &str) {
        let changed = self.shared.query.send_if_modified(|query| {
            if query == text {
                false
            } else {
                text.clone_into(query);
                true
            }
        });
        if changed {
            self.shared
                .view
                .send_modify(|view| text.clone_into(&mut view.query));
        }
    }

    #[must_use]
    pub fn query(&self) -> String {
        self.shared.query.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionView> {
        self.shared.view.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> SuggestionView {
        self.shared.view.borrow().clone()
    }

    #[must_use]
    pub fn active_engine(&self) -> SearchEngine {
        let settings = self.shared.services.settings.current();
        self.shared
            .services
            .catalog
            .resolve(settings.search_engine)
            .clone()
    }

    /// Engines offered as quick switches, empty when pills are turned off.
    #[must_use]
    pub fn pills(&self) -> Vec<SearchEngine> {
        let settings = self.shared.services.settings.current();
        if !settings.show_pills {
            return Vec::new();
        }
        settings
            .pills_engines
            .iter()
            .filter_map(|id| self.shared.services.catalog.get(*id).cloned())
            .collect()
    }

    /// Switches the active engine; persisted like any other setting.
    pub fn select_engine(&self, engine_id: EngineId) -> Result<(), SessionError> {
        self.shared
            .services
            .settings
            .set_search_engine(engine_id)?;
        Ok(())
    }

    /// Opens the results page for `query` and records it in the history.
    ///
    /// Blank queries are ignored. A browser or storage failure is logged and
    /// does not fail the submission.
    pub async fn submit(&self, query: &str) -> Result<Option<Url>, SessionError> {
        if query.trim().is_empty() {
            return Ok(None);
        }

        let engine = self.active_engine();
        let url = engine.result_url(query).map_err(NavigationError::from)?;

        if let Err(e) = self.shared.services.navigator.open(&url) {
            warn!(error = %e, %url, "Failed to open results page");
        }

        let entry = HistoryEntry::now(engine.id, query);
        if let Err(e) = self.shared.services.history.insert_or_replace(entry).await {
            warn!(error = %e, "Failed to record search in history");
        }

        Ok(Some(url))
    }

    pub async fn delete_entry(&self, entry: &HistoryEntry) -> Result<bool, SessionError> {
        Ok(self.shared.services.history.delete(entry).await?)
    }

    /// Stops background work. Results still in flight are never published.
    pub fn close(&self) {
        self.shared.cancel.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Closes the session and waits for its tasks to finish.
    pub async fn shutdown(mut self) {
        self.close();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Session task ended abnormally");
            }
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_put_history_before_live() {
        let view = SuggestionView {
            query: "ru".to_string(),
            history: vec![HistoryEntry::new(EngineId::from_index(0), "rust", 1)],
            live: vec!["rust".to_string(), "ruby".to_string()],
        };
        let rows = view.rows();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], SuggestionRow::History(_)));
        assert_eq!(
            rows.iter().map(SuggestionRow::text).collect::<Vec<_>>(),
            ["rust", "rust", "ruby"]
        );
    }

    #[test]
    fn scope_follows_all_engines_setting() {
        let mut settings = Settings::default();
        assert_eq!(history_scope(&settings), HistoryScope::All);
        settings.suggest_history_all_engines = false;
        settings.search_engine = EngineId::from_index(3);
        assert_eq!(
            history_scope(&settings),
            HistoryScope::Engine(EngineId::from_index(3))
        );
    }
}
