use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::domain::EngineId;

/// Catalog position of Startpage; its suggestion endpoint needs a browser user agent.
pub const STARTPAGE: usize = 4;

/// Catalog position of Swisscows; it answers with a bare suggestion array.
pub const SWISSCOWS: usize = 5;

/// Catalog position of Reddit; it answers with a `{"names": [...]}` object.
pub const REDDIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEngine {
    pub id: EngineId,
    pub name: String,
    pub suggestion_url: String,
    pub search_url: String,
}

impl SearchEngine {
    fn builtin(index: usize, name: &str, suggestion_url: &str, search_url: &str) -> Self {
        Self {
            id: EngineId::from_index(index),
            name: name.to_string(),
            suggestion_url: suggestion_url.to_string(),
            search_url: search_url.to_string(),
        }
    }

    #[must_use]
    pub fn suggestion_url_for(&self, query: &str) -> String {
        format!("{}{}", self.suggestion_url, urlencoding::encode(query))
    }

    /// Builds the results page address for `query`.
    pub fn result_url(&self, query: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.search_url, urlencoding::encode(query)))
    }

    /// Label shown on the query box and the launcher shortcut.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("Search in {}", self.name)
    }

    #[must_use]
    pub fn is_builtin(&self, index: usize) -> bool {
        self.id == EngineId::from_index(index)
    }
}

/// Immutable table of every engine the app knows about.
///
/// Built once at startup and shared by `Arc`; nothing mutates it afterwards.
#[derive(Debug)]
pub struct EngineCatalog {
    engines: Vec<SearchEngine>,
}

impl EngineCatalog {
    #[must_use]
    pub fn builtin() -> Self {
        let engines = vec![
            SearchEngine::builtin(
                0,
                "DuckDuckGo",
                "https://ac.duckduckgo.com/ac/?type=list&q=",
                "https://duckduckgo.com/?q=",
            ),
            SearchEngine::builtin(
                1,
                "Google",
                "https://suggestqueries.google.com/complete/search?client=firefox&q=",
                "https://www.google.com/search?q=",
            ),
            SearchEngine::builtin(
                2,
                "Ecosia",
                "https://ac.ecosia.org/?type=list&q=",
                "https://www.ecosia.org/search?q=",
            ),
            SearchEngine::builtin(
                3,
                "Brave",
                "https://search.brave.com/api/suggest?q=",
                "https://search.brave.com/search?q=",
            ),
            SearchEngine::builtin(
                STARTPAGE,
                "Startpage",
                "https://www.startpage.com/osuggestions?q=",
                "https://www.startpage.com/sp/search?query=",
            ),
            SearchEngine::builtin(
                SWISSCOWS,
                "Swisscows",
                "https://api.swisscows.com/suggest?query=",
                "https://swisscows.com/web?query=",
            ),
            SearchEngine::builtin(
                6,
                "Bing",
                "https://api.bing.com/osjson.aspx?query=",
                "https://www.bing.com/search?q=",
            ),
            SearchEngine::builtin(
                7,
                "Yahoo",
                "https://search.yahoo.com/sugg/gossip/gossip-us-ura/?output=fxjson&command=",
                "https://search.yahoo.com/search?p=",
            ),
            SearchEngine::builtin(
                8,
                "YouTube",
                "https://suggestqueries.google.com/complete/search?ds=yt&client=firefox&q=",
                "https://www.youtube.com/search?q=",
            ),
            SearchEngine::builtin(
                9,
                "Wikipedia (English)",
                "https://wikipedia.org/w/api.php?action=opensearch&search=",
                "https://wikipedia.org/wiki/Special:Search?search=",
            ),
            SearchEngine::builtin(
                REDDIT,
                "Reddit",
                "https://www.reddit.com/api/search_reddit_names.json?query=",
                "https://www.reddit.com/search/?q=",
            ),
        ];

        Self { engines }
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::builtin())
    }

    #[must_use]
    pub fn get(&self, id: EngineId) -> Option<&SearchEngine> {
        self.engines.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: EngineId) -> bool {
        self.get(id).is_some()
    }

    /// Looks `id` up, falling back to the first engine when it is unknown.
    #[must_use]
    pub fn resolve(&self, id: EngineId) -> &SearchEngine {
        self.get(id).unwrap_or_else(|| self.default_engine())
    }

    #[must_use]
    pub fn default_engine(&self) -> &SearchEngine {
        &self.engines[0]
    }

    /// Finds an engine by case-insensitive name prefix or by id string.
    /// A blank needle matches nothing.
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<&SearchEngine> {
        let needle = needle.trim();
        if needle.is_empty() {
            return None;
        }
        if let Ok(id) = needle.parse::<EngineId>() {
            return self.get(id);
        }

        let needle = needle.to_lowercase();
        self.engines
            .iter()
            .find(|e| e.name.to_lowercase() == needle)
            .or_else(|| {
                self.engines
                    .iter()
                    .find(|e| e.name.to_lowercase().starts_with(&needle))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchEngine> {
        self.engines.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl Default for EngineCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
