//! One-shot suggestion listing

use crate::clients::SuggestionSource;
use crate::services::{HistoryScope, SuggestionView, history_suggestions};
use crate::state::SharedState;

pub async fn cmd_suggest(
    state: &SharedState,
    query: &str,
    engine: Option<&str>,
) -> anyhow::Result<()> {
    let settings = state.settings.current();
    let engine_id = match engine {
        Some(name) => state.engine_by_name(name)?,
        None => settings.search_engine,
    };
    let engine = state.catalog.resolve(engine_id);

    let scope = if settings.suggest_history_all_engines {
        HistoryScope::All
    } else {
        HistoryScope::Engine(engine.id)
    };
    let entries = state.history.list(scope).await?;

    let view = SuggestionView {
        query: query.to_string(),
        history: history_suggestions(&entries, query, settings.suggest_history),
        live: state.suggestions.fetch_suggestions(query, engine).await,
    };

    println!("{} - \"{}\"", engine.placeholder(), query);
    println!("{:-<70}", "");
    super::print_rows(&view);

    Ok(())
}
