use herald_broadcast::BroadcasterManager;
use herald_server::error::{Result as ServerResult, ServerError};
use herald_server::{AppState, build_router, logger, signals};

use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ServerResult<()> {
    // A missing .env is fine; the process environment still applies
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Ignoring unreadable .env file: {}", e);
    }

    // Load and validate configuration
    let config = herald_config::Config::load()?;
    config.validate()?;

    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = herald_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);
        std::fs::create_dir_all(&log_dir)?;
        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting herald-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let manager = Arc::new(BroadcasterManager::from_config(&config));
    let snapshot = manager.status();
    info!(
        "Broadcasters ready: {}/{} available, primary={}",
        snapshot.available_broadcasters,
        snapshot.total_broadcasters,
        snapshot.primary.as_deref().unwrap_or("<none>")
    );

    let state = AppState::new(Arc::clone(&manager));
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: bind_addr.clone(),
            source: e,
        })?;

    // Port 0 means auto-assigned
    let actual_addr = listener.local_addr()?;
    info!("Server listening on {}", actual_addr);

    let _signals = signals::spawn_signal_listener(shutdown.clone())?;

    let mut guard = shutdown.subscribe_guard();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            guard.wait().await;
            info!("HTTP server stopped accepting requests");
        })
        .await;

    if let Err(e) = &served {
        warn!("HTTP server ended with error: {}", e);
    }

    // Pending batches are flushed before the process exits
    manager.shutdown().await;
    info!("Graceful shutdown complete");

    served?;
    Ok(())
}
