//! Turning host shutdown signals into a query abort

use claude_code_sdk::AbortController;
use std::io;
use tokio::task::JoinHandle;

/// Abort `controller` on Ctrl-C, or on SIGTERM on unix
///
/// The SIGTERM listener is installed before this returns, so a signal sent
/// right after the call is not missed. Aborting lets the query terminate the
/// CLI child before the action exits.
///
/// # Errors
///
/// Returns an error if the SIGTERM handler cannot be installed.
pub fn abort_on_shutdown(controller: AbortController) -> io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, aborting Claude Code"),
            _ = terminate => tracing::info!("Received SIGTERM, aborting Claude Code"),
        }
        controller.abort();
    }))
}
