//! Autocomplete client for the engines in the catalog.
//!
//! Every engine is queried with a plain GET on its suggestion prefix. The
//! response shape and the request headers are chosen by engine identity, never
//! by name, so a renamed engine keeps working.

use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::http::{ERROR_PREFIX, FIREFOX_ANDROID_USER_AGENT};
use crate::models::SearchEngine;
use crate::models::engine::{REDDIT, STARTPAGE, SWISSCOWS};

/// Failures while fetching suggestions. Never leaves this module: callers get
/// an `"Error: ..."` row instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected suggestion response shape")]
    UnexpectedShape,

    #[error("Suggestion endpoint returned {0}")]
    Status(reqwest::StatusCode),
}

/// How an engine lays out its suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `[query, [s1, s2, ...], ...]`
    OpenSearch,
    /// `[s1, s2, ...]`
    TopLevel,
    /// `{"names": [s1, s2, ...]}`
    Names,
}

impl ResponseShape {
    #[must_use]
    pub fn for_engine(engine: &SearchEngine) -> Self {
        if engine.is_builtin(SWISSCOWS) {
            Self::TopLevel
        } else if engine.is_builtin(REDDIT) {
            Self::Names
        } else {
            Self::OpenSearch
        }
    }
}

/// Extracts the suggestion strings from a response body.
///
/// Non-string items inside the list are skipped.
pub fn parse_suggestions(body: &str, shape: ResponseShape) -> Result<Vec<String>, FetchError> {
    let value: Value = serde_json::from_str(body)?;

    let list = match shape {
        ResponseShape::OpenSearch => value.get(1),
        ResponseShape::TopLevel => Some(&value),
        ResponseShape::Names => value.get("names"),
    }
    .and_then(Value::as_array)
    .ok_or(FetchError::UnexpectedShape)?;

    Ok(list
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Source of live suggestions for a query.
///
/// Implementations never fail: problems are reported in-band as a single
/// `"Error: <message>"` entry, and a rejected request yields an empty list.
#[async_trait::async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch_suggestions(&self, query: &str, engine: &SearchEngine) -> Vec<String>;
}

#[derive(Clone)]
pub struct SuggestionClient {
    client: Client,
}

impl Default for SuggestionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a client whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: std::time::Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client })
    }

    /// Creates a client on top of the application-wide HTTP client.
    #[must_use]
    pub const fn with_shared_client(client: Client) -> Self {
        Self { client }
    }

    async fn try_fetch(
        &self,
        query: &str,
        engine: &SearchEngine,
    ) -> Result<Vec<String>, FetchError> {
        let url = engine.suggestion_url_for(query);

        let mut request = self.client.get(&url);
        if engine.is_builtin(STARTPAGE) {
            request = request.header(USER_AGENT, FIREFOX_ANDROID_USER_AGENT);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        parse_suggestions(&body, ResponseShape::for_engine(engine))
    }
}

#[async_trait::async_trait]
impl SuggestionSource for SuggestionClient {
    async fn fetch_suggestions(&self, query: &str, engine: &SearchEngine) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        match self.try_fetch(query, engine).await {
            Ok(suggestions) => {
                debug!(
                    engine = %engine.name,
                    count = suggestions.len(),
                    "Fetched suggestions"
                );
                suggestions
            }
            Err(FetchError::Status(status)) => {
                debug!(engine = %engine.name, %status, "Suggestion request rejected");
                Vec::new()
            }
            Err(e) => {
                warn!(engine = %engine.name, error = %e, "Suggestion request failed");
                vec![format!("{ERROR_PREFIX}{e}")]
            }
        }
    }
}
