//! Line-driven search screen.
//!
//! Every line typed replaces the query; lines starting with `:` are commands.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::services::{BrowserNavigator, SearchSession, SettingsStore, SuggestionRow};
use crate::state::SharedState;

const INTRO: &str = "\
Welcome to BetterSearch!

Type to see suggestions from your search history and from the active search
engine. Suggestions marked with ↺ come from your history.

  :go            search for the current query
  :<n>           search for suggestion number n
  :delete <n>    remove history suggestion n
  :engine <name> switch the search engine
  :pills         list quick-switch engines
  :help          show this help
  :q             quit
";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Query(&'a str),
    Submit,
    Pick(usize),
    Delete(usize),
    Engine(&'a str),
    Pills,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line);
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    match name {
        "q" | "quit" => Input::Quit,
        "go" => Input::Submit,
        "pills" => Input::Pills,
        "help" | "h" => Input::Help,
        "engine" | "e" if !arg.is_empty() => Input::Engine(arg),
        "delete" | "d" => arg.parse().map_or(Input::Unknown(line), Input::Delete),
        n => n.parse().map_or(Input::Unknown(line), Input::Pick),
    }
}

fn prompt(session: &SearchSession) {
    print!("{}> ", session.active_engine().placeholder());
    std::io::stdout().flush().ok();
}

/// Prints the intro unless it was already seen. Returns whether it was shown.
fn show_intro_once(settings: &SettingsStore) -> bool {
    if settings.current().intro_done {
        return false;
    }
    println!("{INTRO}");
    settings.set_intro_done(true);
    true
}

async fn submit(session: &SearchSession, query: &str) -> anyhow::Result<()> {
    if let Some(url) = session.submit(query).await? {
        println!("Opened {url}");
        session.set_query("");
    }
    Ok(())
}

pub async fn cmd_interactive(state: &SharedState, initial_query: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let persister = state.settings.spawn_persister(cancel.clone());

    show_intro_once(&state.settings);
    let retention = state.retention.spawn_watcher(
        state.history.clone(),
        state.catalog.clone(),
        cancel.clone(),
    );

    let services = state.session_services(Arc::new(BrowserNavigator), None)?;
    let session = SearchSession::with_debounce(
        services,
        initial_query,
        state.config.suggestions.debounce(),
    );

    let mut view_rx = session.subscribe();
    let render = tokio::spawn(async move {
        while view_rx.changed().await.is_ok() {
            let view = view_rx.borrow_and_update().clone();
            println!();
            super::print_rows(&view);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&session);

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Quit => break,
            Input::Query(text) => session.set_query(text),
            Input::Submit => submit(&session, &session.query()).await?,
            Input::Pick(n) => {
                let view = session.view();
                let picked = n
                    .checked_sub(1)
                    .and_then(|i| view.rows().get(i).map(|row| row.text().to_string()));
                match picked {
                    Some(query) => submit(&session, &query).await?,
                    None => println!("No suggestion {n}"),
                }
            }
            Input::Delete(n) => {
                let view = session.view();
                let rows = view.rows();
                match n.checked_sub(1).and_then(|i| rows.get(i)) {
                    Some(SuggestionRow::History(entry)) => {
                        session.delete_entry(entry).await?;
                    }
                    _ => println!("Suggestion {n} is not from the history"),
                }
            }
            Input::Engine(name) => match state.engine_by_name(name) {
                Ok(engine_id) => session.select_engine(engine_id)?,
                Err(e) => println!("{e}"),
            },
            Input::Pills => {
                let active = session.active_engine();
                for engine in session.pills() {
                    let marker = if engine.id == active.id { "*" } else { " " };
                    println!("{marker} {}", engine.name);
                }
            }
            Input::Help => println!("{INTRO}"),
            Input::Unknown(text) => println!("Unknown command: {text} (try :help)"),
        }
        prompt(&session);
    }

    println!();
    session.shutdown().await;
    render.abort();
    cancel.cancel();

    if let Some(persister) = persister {
        persister.await?;
    }
    retention.await?;

    Ok(())
}
