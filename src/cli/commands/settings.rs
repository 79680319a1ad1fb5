use crate::domain::EngineId;
use crate::services::settings::keys;
use crate::state::SharedState;

fn engine_name(state: &SharedState, id: EngineId) -> String {
    state
        .catalog
        .get(id)
        .map_or_else(|| id.to_string(), |e| e.name.clone())
}

pub fn cmd_settings_show(state: &SharedState) {
    let settings = state.settings.current();
    let pills = settings
        .pills_engines
        .iter()
        .map(|id| engine_name(state, *id))
        .collect::<Vec<_>>()
        .join(", ");

    println!("Settings");
    println!("{:-<70}", "");
    println!("{} = {}", keys::THEME, settings.theme);
    println!("{} = {}", keys::DYNAMIC_COLORS, settings.dynamic_colors);
    println!(
        "{} = {}",
        keys::SEARCH_ENGINE,
        engine_name(state, settings.search_engine)
    );
    println!("{} = {}", keys::SHOW_PILLS, settings.show_pills);
    println!("{} = {}", keys::PILLS_ENGINES, pills);
    println!("{} = {}", keys::SUGGEST_HISTORY, settings.suggest_history);
    println!(
        "{} = {}",
        keys::SUGGEST_HISTORY_ALL_ENGINES,
        settings.suggest_history_all_engines
    );
    println!("{} = {}", keys::INTRO_DONE, settings.intro_done);

    if let Some(path) = state.settings.path() {
        println!();
        println!("Stored in {}", path.display());
    }
}

pub async fn cmd_settings_set(state: &SharedState, key: &str, value: &str) -> anyhow::Result<()> {
    if !keys::ALL.contains(&key) {
        anyhow::bail!("Unknown setting '{key}'. Known settings: {}", keys::ALL.join(", "));
    }

    state.settings.set_from_str(key, value)?;
    state.settings.flush().await?;
    println!("Updated {key}.");

    Ok(())
}
