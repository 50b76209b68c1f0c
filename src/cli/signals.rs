//! Shutdown signal handling for the interactive session

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Resolves once the user asks the process to stop:
/// Ctrl+C everywhere, SIGTERM as well on Unix.
pub async fn shutdown_requested() -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
