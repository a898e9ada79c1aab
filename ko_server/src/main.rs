//! Single-elimination tournament server.
//!
//! Serves the JSON API on top of either PostgreSQL or an in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use knockout::db::{Database, MemoryStore, SharedStore};
use knockout::tournament::{RandomShuffler, SeededShuffler, Shuffler};
use ko_server::{
    api,
    config::{Overrides, ServerConfig, StoreBackend},
    logging,
};
use pico_args::Arguments;
use tokio::sync::mpsc;
use tracing::info;

const HELP: &str = "\
Run a single-elimination tournament server

USAGE:
  ko_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --seed       N           Fixed seed for bracket shuffling  [default: env BRACKET_SEED or random]

FLAGS:
  --memory                 Keep all data in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORE_BACKEND            postgres or memory
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Connection pool size
  BRACKET_SEED             Fixed seed for bracket shuffling
  RUST_LOG                 Log filter (e.g., info,knockout=debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        memory: pargs.contains("--memory"),
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        bracket_seed: pargs.opt_value_from_str("--seed")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    // Ctrl+C and SIGTERM both trigger a graceful shutdown.
    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
    set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    let (store, database): (SharedStore, Option<Database>) = match config.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.init_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to apply schema: {}", e))?;
            info!("Database connected successfully");
            (Arc::new(db.store()), Some(db))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    let shuffler: Arc<dyn Shuffler> = match config.bracket_seed {
        Some(seed) => {
            info!(seed, "Bracket shuffling uses a fixed seed");
            Arc::new(SeededShuffler::new(seed))
        }
        None => Arc::new(RandomShuffler),
    };

    let app = api::create_router(api::AppState::new(store, shuffler));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Resolves once the signal handler fires
async fn shutdown_signal(mut rx: mpsc::UnboundedReceiver<()>) {
    rx.recv().await;
}
