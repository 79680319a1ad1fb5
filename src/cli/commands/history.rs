use crate::models::HistoryEntry;
use crate::models::history::{format_age, format_timestamp};
use crate::services::HistoryScope;
use crate::state::SharedState;

pub async fn cmd_history_list(
    state: &SharedState,
    engine: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let scope = match engine {
        Some(name) => HistoryScope::Engine(state.engine_by_name(name)?),
        None => HistoryScope::All,
    };
    let entries = state.history.list(scope).await?;

    if entries.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!(
        "Search History (showing {} of {})",
        entries.len().min(limit),
        entries.len()
    );
    println!("{:-<70}", "");

    let now = chrono::Utc::now().timestamp_millis();
    for entry in entries.iter().take(limit) {
        let engine_name = state
            .catalog
            .get(entry.engine_id)
            .map_or("Unknown engine", |e| e.name.as_str());
        println!("• {} ({})", entry.query, format_age(now, entry));
        println!("  at {} with {}", format_timestamp(entry), engine_name);
    }

    Ok(())
}

pub async fn cmd_history_delete(
    state: &SharedState,
    query: &str,
    engine: Option<&str>,
) -> anyhow::Result<()> {
    let engine_id = match engine {
        Some(name) => state.engine_by_name(name)?,
        None => state.settings.current().search_engine,
    };

    let entry = HistoryEntry::new(engine_id, query, 0);
    if state.history.delete(&entry).await? {
        println!("Removed \"{query}\" from history.");
    } else {
        println!("\"{query}\" is not in the history of this engine.");
    }

    Ok(())
}
