pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;

use clap::{CommandFactory, Parser};
pub use config::Config;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ProgressCommands, WatchMapCommands};
use models::tracking::WatchProgressInput;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = Cli::parse().command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Search {
            query,
            limit,
            lang,
            sources,
            save,
        } => {
            let query = query.join(" ");
            cli::cmd_search(&config, &query, limit, lang.as_deref(), sources, save).await
        }

        Commands::Show { uid, lang } => cli::cmd_show(&config, &uid, lang.as_deref()).await,

        Commands::Resolve { uid } => cli::cmd_resolve(&config, &uid).await,

        Commands::Track { list, uid, user } => cli::cmd_track(&config, &list, &uid, &user).await,

        Commands::Untrack { list, uid, user } => {
            cli::cmd_untrack(&config, &list, &uid, &user).await
        }

        Commands::List { list, user } => cli::cmd_list(&config, &list, &user).await,

        Commands::WatchMap { command } => match command {
            WatchMapCommands::Set {
                uid,
                source,
                url,
                title,
            } => cli::cmd_watch_map_set(&config, &uid, &source, &url, title.as_deref()).await,
            WatchMapCommands::Get { uid } => cli::cmd_watch_map_get(&config, &uid).await,
            WatchMapCommands::Clear { uid } => cli::cmd_watch_map_clear(&config, &uid).await,
        },

        Commands::Progress { command } => match command {
            ProgressCommands::Start {
                uid,
                episode,
                user,
                number,
                source,
                quality,
                via,
            } => {
                let input = WatchProgressInput {
                    anime_uid: uid,
                    episode_label: episode,
                    episode_number: number,
                    source,
                    quality,
                    started_via: via,
                };
                cli::cmd_progress_start(&config, &user, input).await
            }
            ProgressCommands::Delete { uid, user } => {
                cli::cmd_progress_delete(&config, &user, &uid).await
            }
            ProgressCommands::Recent { user, limit, lang } => {
                cli::cmd_progress_recent(&config, &user, limit, lang.as_deref()).await
            }
        },

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }
    }
}
