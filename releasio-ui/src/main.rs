//! releasio-ui - Releasio dashboard service
//!
//! Serves the dashboard's persisted state to browser sessions, gating every
//! change through the team's roles and permissions.

use anyhow::Result;
use clap::Parser;
use releasio_common::cells::standard_registry;
use releasio_common::config::{CompiledDefaults, RootFolderInitializer, RootFolderResolver};
use releasio_common::db::init_database;
use releasio_common::events::EventBus;
use releasio_common::store::SqliteBackend;
use releasio_common::Store;
use releasio_ui::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "releasio-ui", version, about = "Releasio dashboard service")]
struct Args {
    /// Folder holding releasio.db
    #[arg(long, env = "RELEASIO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "RELEASIO_BIND")]
    bind: Option<String>,

    /// Events buffered per SSE client before it starts losing them
    #[arg(long, env = "RELEASIO_EVENT_CAPACITY")]
    event_capacity: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = CompiledDefaults::for_current_platform();
    let resolver = RootFolderResolver::new("releasio-ui").with_cli_arg(args.root_folder.clone());
    let toml = resolver.load_toml().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&toml.logging.level)),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting Releasio dashboard (releasio-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer.ensure_directory_exists()?;
    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let capacity = args
        .event_capacity
        .or(toml.event_capacity)
        .unwrap_or(defaults.event_capacity);
    let events = EventBus::new(capacity);
    let store = Store::open(
        Arc::new(SqliteBackend::new(pool.clone())),
        Arc::new(events.clone()),
        standard_registry()?,
    )
    .await?;

    let app = build_router(AppState::new(store.clone(), events));

    let bind = args
        .bind
        .or(toml.bind_address)
        .unwrap_or(defaults.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("releasio-ui listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down; flushing pending writes");
    store.flush().await;
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
