use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use game_persistence::DatabaseManager;
use game_server::{auth::JwtService, config::Config, create_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting gomoku server...");

    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);
    let addr = config.socket_addr()?;

    let database = Arc::new(DatabaseManager::new(config.database_url.clone()));
    database
        .start()
        .await
        .context("Failed to connect to database and run migrations")?;

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_ttl()));
    let routes = create_routes(database.clone(), jwt_service, config.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            shutdown_rx.await.ok();
        })
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    let server = tokio::spawn(server);

    wait_for_shutdown_signal().await?;

    database.stop().await;
    shutdown_tx.send(()).ok();

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(Ok(())) => info!("Server shutdown complete."),
        Ok(Err(err)) => error!(error = %err, "Server task failed during shutdown"),
        Err(_) => warn!(
            timeout_seconds = config.shutdown_timeout_seconds,
            "Server did not shut down in time, exiting anyway"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    // Wait for SIGINT (Ctrl+C) or SIGTERM
    #[cfg(unix)]
    {
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("Failed to install SIGINT handler")?;
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("Failed to listen for ctrl+c")?;
        info!("Received Ctrl+C, shutting down gracefully...");
    }

    Ok(())
}
