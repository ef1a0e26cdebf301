//! Join board
//!
//! Kanban board with contacts and task forms, served as a web UI and
//! scriptable from the command line.

use anyhow::{Context, Result, anyhow};
use chrono::Timelike;
use clap::Parser;
use join_board::auth;
use join_board::board::Board;
use join_board::cli::{Cli, Command};
use join_board::config::{Config, ConfigLoader};
use join_board::dashboard::{self, App};
use join_board::error::JoinError;
use join_board::remote::{FirebaseClient, MemoryRemote, RemoteStore};
use join_board::render::text::{format_board_markdown, format_summary_markdown};
use join_board::session::{FileSessionStorage, MemorySessionStorage, SessionStorage};
use join_board::store::DataStore;
use join_board::summary;
use join_board::types::{Category, CollectionKind};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {}
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)
                .with_context(|| format!("opening log file {}", filename))?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(std::path::Path::new(path))?,
        None => ConfigLoader::load()?,
    };

    let config = loader.config_mut();
    if let Some(url) = &cli.remote_url {
        config.remote.base_url = Some(url.clone());
    }
    if let Some(dir) = &cli.session_dir {
        config.session.dir = Some(dir.into());
    }
    if let Some(port) = cli.port {
        config.ui.port = port;
    }
    let config = loader.into_config();

    let mut store = open_store(&config)?;

    match cli.command {
        Some(Command::Serve) | None => run_server(store, &config).await?,
        Some(Command::Board { query }) => {
            store.initialize().await?;
            let mut board = Board::load(&store);
            board.set_query(query.as_deref());
            print!("{}", format_board_markdown(&board.columns(), board.query()));
        }
        Some(Command::Summary) => {
            store.initialize().await?;
            let metrics = summary::refresh(&store)?;
            let user = auth::current_user(&store);
            let greeting = summary::greeting(chrono::Local::now().hour());
            print!(
                "{}",
                format_summary_markdown(&metrics, greeting, user.as_ref().map(|u| u.name.as_str()))
            );
        }
        Some(Command::Move { task_id, category }) => {
            let target = Category::parse(&category)
                .ok_or_else(|| anyhow!("Unknown category: {}", category))?;
            store.initialize().await?;
            let mut board = Board::load(&store);
            if !board.move_to(&task_id, target, &mut store)? {
                return Err(JoinError::task_not_found(&task_id).into());
            }
            if store.write_through() && !store.sync(CollectionKind::Tasks).await {
                warn!("Write-through failed; move kept in session only");
            }
            println!("Moved {} to {}", task_id, target.label());
        }
        Some(Command::ResetSession) => {
            store.storage().clear()?;
            println!("Session cleared");
        }
    }

    Ok(())
}

/// Build the store from the remote and session settings.
fn open_store(config: &Config) -> Result<DataStore> {
    let remote: Arc<dyn RemoteStore> = match &config.remote.base_url {
        Some(url) => {
            info!(url = %url, "Using remote database");
            Arc::new(FirebaseClient::new(url.clone()))
        }
        None => {
            info!("No remote database configured; running offline");
            Arc::new(MemoryRemote::new())
        }
    };

    let storage: Arc<dyn SessionStorage> = match &config.session.dir {
        Some(dir) => Arc::new(
            FileSessionStorage::open(dir)
                .with_context(|| format!("opening session directory {}", dir.display()))?,
        ),
        None => Arc::new(MemorySessionStorage::new()),
    };

    Ok(DataStore::new(remote, storage).with_write_through(config.remote.write_through))
}

async fn run_server(store: DataStore, config: &Config) -> Result<()> {
    info!("Starting Join board v{}", env!("CARGO_PKG_VERSION"));

    let app = App::start(store).await?;
    let (shutdown_tx, addr) = dashboard::start_server(app, &config.ui).await?;
    println!("Join board running at http://{}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    let _ = shutdown_tx.send(());
    Ok(())
}
