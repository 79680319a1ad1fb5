pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod matching;
pub mod models;
pub mod services;
pub mod state;

use cli::{Cli, Commands, HistoryCommands, SettingsCommands};
pub use config::{Config, LogFormat};
use state::SharedState;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout belongs to command output
    match config.general.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    if matches!(cli.command, Some(Commands::Init)) {
        return cli::cmd_init(&config);
    }

    let state = if cli.ephemeral {
        SharedState::ephemeral(config)?
    } else {
        SharedState::new(config).await?
    };
    debug!(ephemeral = cli.ephemeral, "Application state ready");

    match cli.command {
        None => cli::cmd_interactive(&state, "").await,

        Some(Commands::Interactive { query }) => {
            cli::cmd_interactive(&state, &query.join(" ")).await
        }

        Some(Commands::Suggest { query, engine }) => {
            cli::cmd_suggest(&state, &query.join(" "), engine.as_deref()).await
        }

        Some(Commands::Search {
            query,
            engine,
            no_open,
        }) => cli::cmd_search(&state, &query.join(" "), engine.as_deref(), no_open).await,

        Some(Commands::Engines) => {
            cli::cmd_engines(&state);
            Ok(())
        }

        Some(Commands::History { command }) => match command {
            HistoryCommands::List { engine, limit } => {
                cli::cmd_history_list(&state, engine.as_deref(), limit).await
            }
            HistoryCommands::Delete { query, engine } => {
                cli::cmd_history_delete(&state, &query.join(" "), engine.as_deref()).await
            }
        },

        Some(Commands::Settings { command }) => match command {
            SettingsCommands::Show => {
                cli::cmd_settings_show(&state);
                Ok(())
            }
            SettingsCommands::Set { key, value } => {
                cli::cmd_settings_set(&state, &key, &value).await
            }
        },

        Some(Commands::Init) => cli::cmd_init(&state.config),
    }
}
