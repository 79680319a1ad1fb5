mod engines;
mod history;
mod init;
mod interactive;
mod search;
mod settings;
mod suggest;

pub use engines::cmd_engines;
pub use history::{cmd_history_delete, cmd_history_list};
pub use init::cmd_init;
pub use interactive::cmd_interactive;
pub use search::cmd_search;
pub use settings::{cmd_settings_set, cmd_settings_show};
pub use suggest::cmd_suggest;

use crate::services::{SuggestionRow, SuggestionView};

/// Prints the numbered suggestion list, history rows first.
fn print_rows(view: &SuggestionView) {
    let rows = view.rows();
    if rows.is_empty() {
        println!("  (no suggestions)");
        return;
    }

    for (i, row) in rows.iter().enumerate() {
        match row {
            SuggestionRow::History(entry) => println!("{:>3}. ↺ {}", i + 1, entry.query),
            SuggestionRow::Live(text) => println!("{:>3}.   {}", i + 1, text),
        }
    }
}
