use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use nutri_track_api::config::ServerConfig;
use nutri_track_api::create_application;
use nutri_track_data::database::{initialize_sqlite_pool, DatabaseConfig};
use nutri_track_data::repository::{KeyValueStore, SqliteStorage};
use nutri_track_domain::remote::{HttpBackend, RemoteConfig};
use nutri_track_domain::NutritionAppBuilder;

/// How long queued background pushes may take after the server stops
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The main entry point for the NutriTrack API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Opens the local SQLite store
/// 4. Wires the stores and services and starts the background sync worker
/// 5. Serves the Axum application until a shutdown signal arrives
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting NutriTrack API server");

    let config = ServerConfig::from_env();

    let db_config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let pool = initialize_sqlite_pool(&db_config).context("could not open the local store")?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStorage::new(pool));

    let backend = Arc::new(HttpBackend::new(RemoteConfig::from_env()));

    let (app, worker) = NutritionAppBuilder::with_remote(storage, backend)
        .queue_capacity(config.sync_queue_capacity)
        .build();
    let worker = worker.spawn();

    let router = create_application(app, config.environment.clone());

    let addr = config.address();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router held the last queue handles; the worker stops once the
    // remaining jobs are done
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => info!("Background sync worker stopped"),
        Ok(Err(e)) => error!("Background sync worker failed: {}", e),
        Err(_) => warn!("Background sync worker still busy after {:?}", WORKER_DRAIN_TIMEOUT),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on CTRL+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
