//! Engine catalog listing

use crate::state::SharedState;

pub fn cmd_engines(state: &SharedState) {
    let settings = state.settings.current();

    println!("Search Engines ({} total)", state.catalog.len());
    println!("{:-<70}", "");

    for engine in state.catalog.iter() {
        let marker = if engine.id == settings.search_engine {
            "*"
        } else {
            " "
        };
        let pill = if settings.pills_engines.contains(&engine.id) {
            " [pill]"
        } else {
            ""
        };
        println!("{marker} {}{pill}", engine.name);
        println!("  ID: {}", engine.id);
    }

    println!();
    println!("Legend: * active engine | [pill] quick switch");
}
