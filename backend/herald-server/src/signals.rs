//! Process signals that trigger graceful shutdown.
//!
//! On Unix both SIGINT and SIGTERM are handled; elsewhere only Ctrl+C.
//! Handlers are registered before [`spawn_signal_listener`] returns, so a
//! signal delivered right after startup is never lost to the default action.

use herald_broadcast::ShutdownCoordinator;

use log::info;
use tokio::task::JoinHandle;

/// Register the handlers and spawn a task that fires `shutdown` on the first
/// signal received.
#[cfg(unix)]
pub fn spawn_signal_listener(shutdown: ShutdownCoordinator) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        info!("Received {}, initiating graceful shutdown", name);
        shutdown.shutdown();
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_listener(shutdown: ShutdownCoordinator) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown");
                shutdown.shutdown();
            }
            Err(e) => log::error!("Failed to listen for Ctrl+C: {}", e),
        }
    }))
}
