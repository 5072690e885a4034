//! Tournament server using the async actor model.
//!
//! Each tournament runs in its own actor managed by TournamentManager. State
//! is kept in Postgres when `DATABASE_URL` is set, in memory otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use tourney::{
    TournamentManager,
    db::{InMemoryTournamentRepository, PgTournamentRepository, TournamentRepository},
};
use tourney_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run the tournament bracket server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, in-memory if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  ADMINS                   Comma-separated organizer handles (required)
  METRICS_BIND             Prometheus exporter address (optional)
  DEFAULT_MAX_TEAMS        Team capacity for tournaments created without one
  RUST_LOG                 Log filter (default: info,sqlx=warn,hyper=warn)
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

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;
    tracing::info!(
        admins = config.admins.len(),
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        tracing::info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let repository: Arc<dyn TournamentRepository> = match &config.database {
        Some(db_config) => {
            let repository = PgTournamentRepository::connect(db_config)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected successfully");
            Arc::new(repository)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, tournaments are kept in memory only");
            Arc::new(InMemoryTournamentRepository::new())
        }
    };

    let manager = Arc::new(TournamentManager::new(repository));
    let loaded = manager
        .load_existing_tournaments()
        .await
        .context("Failed to load tournaments")?;
    let active = manager.active_tournament_count().await;
    metrics::active_tournaments(active);
    tracing::info!("Loaded {} tournament(s), {} active", loaded, active);

    let state = api::AppState {
        manager: manager.clone(),
        authorizer: Arc::new(config.admins.clone()),
        default_max_teams: config.default_max_teams,
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    manager.shutdown().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
