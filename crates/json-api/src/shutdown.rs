//! Graceful shutdown signal handling

use std::{fmt, io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

/// The signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
        })
    }
}

async fn interrupt() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC)?;

    Ok(ShutdownSignal::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(ShutdownSignalError::SigTerm)?
        .recv()
        .await;

    Ok(ShutdownSignal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    std::future::pending().await
}

/// Wait for a stop signal, then let in-flight requests drain for up to `grace`.
///
/// Beacon transitions spawned before the signal finish within the same window.
pub(crate) async fn listen(handle: ServerHandle, grace: Duration) -> Result<(), ShutdownSignalError> {
    let received = tokio::select! {
        result = interrupt() => result?,
        result = terminate() => result?,
    };

    info!(signal = %received, grace_seconds = grace.as_secs(), "shutting down");

    handle.stop_graceful(Some(grace));

    Ok(())
}
