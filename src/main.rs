use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use peeps_api::config;
use peeps_api::database::{schema, DatabaseManager, MemoryStore, PgStore, Store};
use peeps_api::{app, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Memory,
    Postgres,
}

#[derive(Parser)]
#[command(name = "peeps-api")]
#[command(about = "JSON:API server for contacts and their phone numbers")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT / PEEPS_API_PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, help = "Backing store; defaults to postgres when DATABASE_URL is set")]
    store: Option<StoreKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Peeps API in {:?} mode", config.environment);

    let kind = args.store.unwrap_or(match config.database.url {
        Some(_) => StoreKind::Postgres,
        None => StoreKind::Memory,
    });

    let store: Arc<dyn Store> = match kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            if config.database.run_migrations {
                schema::migrate(&pool).await.context("failed to run migrations")?;
            }
            Arc::new(PgStore::new(pool))
        }
    };
    tracing::info!("Using {} store", store.backend());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Peeps API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Peeps API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
