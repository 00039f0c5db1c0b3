use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sn_cli::commands::{export, graph, import, notes, review, stamp, subs, timeline};
use sn_cli::{Cli, Commands, Config, NotesAction, StampAction, SubsAction};
use sn_core::{OwnerId, StampKind};
use sn_store::LocalStore;

/// Load config and open the journal database, ensuring the parent
/// directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(LocalStore<Local>, OwnerId)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store =
        LocalStore::open(&config.database_path, Local).context("failed to open database")?;
    let owner = OwnerId::new(config.owner_id).context("invalid owner ID")?;
    Ok((store, owner))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Notes { action }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            match action {
                NotesAction::List { json } => notes::list(&store, &owner, *json).await?,
                NotesAction::Create { name, shared_id } => {
                    notes::create(&store, &owner, name, shared_id.as_deref()).await?;
                }
                NotesAction::Rename { note, name } => {
                    notes::rename(&store, &owner, note, name).await?;
                }
                NotesAction::Delete { note } => notes::delete(&store, &owner, note).await?,
                NotesAction::Share { note, shared_id } => {
                    notes::share(&store, &owner, note, shared_id).await?;
                }
                NotesAction::Unshare { note } => notes::unshare(&store, &owner, note).await?,
            }
        }
        Some(Commands::Stamp { action }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            match action {
                StampAction::Add {
                    kind,
                    text,
                    at,
                    note,
                } => {
                    stamp::add(&store, &owner, kind, text, at.as_deref(), note.as_deref()).await?;
                }
                StampAction::Show { timestamp, note } => {
                    stamp::show(&store, &owner, *timestamp, note.as_deref()).await?;
                }
                StampAction::Delete { timestamp, note } => {
                    stamp::delete(&store, &owner, *timestamp, note.as_deref()).await?;
                }
                StampAction::Suggest { kind, note } => {
                    stamp::suggest(&store, &owner, kind, note.as_deref()).await?;
                }
            }
        }
        Some(Commands::Timeline { month, note, json }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            timeline::run(&store, &owner, month.as_deref(), note.as_deref(), *json).await?;
        }
        Some(Commands::Review { month, kind, note }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            review::run(
                &store,
                &owner,
                month.as_deref(),
                kind.as_deref(),
                note.as_deref(),
            )
            .await?;
        }
        Some(Commands::Graph { month, note }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            graph::run(&store, &owner, month.as_deref(), note.as_deref()).await?;
        }
        Some(Commands::Export { note, output }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            export::run(&store, &owner, note.as_deref(), output.as_deref()).await?;
        }
        Some(Commands::Import { file, note }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            import::run(&store, &owner, file, note.as_deref()).await?;
        }
        Some(Commands::Kinds) => {
            for kind in StampKind::ALL {
                println!("{kind}  {}", kind.label());
            }
        }
        Some(Commands::Subs { action }) => {
            let (store, owner) = open_store(cli.config.as_deref())?;
            match action {
                SubsAction::Subscribe { shared_id } => {
                    subs::subscribe(&store, &owner, shared_id).await?;
                }
                SubsAction::Unsubscribe { shared_id } => {
                    subs::unsubscribe(&store, &owner, shared_id).await?;
                }
                SubsAction::List => subs::list(&store, &owner).await?,
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
