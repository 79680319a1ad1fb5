//! CLI module - Command-line interface for BetterSearch
//!
//! Without a subcommand the interactive search screen starts.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BetterSearch - search launcher with live suggestions and local history
#[derive(Parser)]
#[command(name = "bettersearch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep history and settings in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive search screen (default)
    #[command(alias = "i")]
    Interactive {
        /// Initial query
        query: Vec<String>,
    },

    /// Show history matches and live suggestions for a query
    Suggest {
        #[arg(required = true)]
        query: Vec<String>,
        /// Engine name or id to use instead of the active one
        #[arg(long, short)]
        engine: Option<String>,
    },

    /// Open the results page for a query and record it
    #[command(alias = "s")]
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Engine name or id to use instead of the active one
        #[arg(long, short)]
        engine: Option<String>,
        /// Print the results URL instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },

    /// List the available search engines
    Engines,

    /// Browse and edit the search history
    #[command(alias = "h")]
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Create default config and settings files
    Init,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List past searches, newest first
    #[command(alias = "ls")]
    List {
        /// Only searches made with this engine
        #[arg(long, short)]
        engine: Option<String>,
        /// Number of entries to show
        #[arg(long, short, default_value = "20")]
        limit: usize,
    },
    /// Remove a search from the history
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true)]
        query: Vec<String>,
        /// Engine the search was made with (default: active engine)
        #[arg(long, short)]
        engine: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print every preference
    Show,
    /// Change one preference
    Set {
        /// Preference name, e.g. `search_engine`
        key: String,
        /// New value
        value: String,
    },
}

pub use commands::*;
