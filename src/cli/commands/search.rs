//! Search submission command handler

use std::sync::Arc;

use crate::services::{BrowserNavigator, Navigator, PrintNavigator, SearchSession};
use crate::state::SharedState;

pub async fn cmd_search(
    state: &SharedState,
    query: &str,
    engine: Option<&str>,
    no_open: bool,
) -> anyhow::Result<()> {
    let navigator: Arc<dyn Navigator> = if no_open {
        Arc::new(PrintNavigator)
    } else {
        Arc::new(BrowserNavigator)
    };
    let engine_override = engine.map(|name| state.engine_by_name(name)).transpose()?;

    let session = SearchSession::start(state.session_services(navigator, engine_override)?, "");
    let url = session.submit(query).await?;
    session.shutdown().await;

    match url {
        Some(url) if !no_open => println!("Opened {url}"),
        Some(_) => {}
        None => println!("Nothing to search for."),
    }

    state.enforce_retention().await
}
