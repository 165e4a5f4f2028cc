//! Abort controller and signal
//!
//! An [`AbortController`] is the caller's side of cancellation; the query
//! holds the matching [`AbortSignal`]. Aborting is one-way: once triggered,
//! a controller stays aborted.
//!
//! # Example
//!
//! ```ignore
//! let controller = AbortController::new();
//! let options = QueryOptions::new().with_abort_controller(controller.clone());
//! let mut stream = query("Summarize README.md", options)?;
//!
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     controller.abort();
//! });
//! ```

use std::sync::Arc;
use tokio::sync::watch;

/// Caller-controlled cancellation for a query
#[derive(Debug, Clone)]
pub struct AbortController {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Create a controller that has not been aborted
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Abort every query observing this controller
    pub fn abort(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("Abort requested");
        }
    }

    /// Whether [`AbortController::abort`] has been called
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Get a signal that observes this controller
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of an [`AbortController`]
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Whether the controller has been aborted
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the controller is aborted
    ///
    /// Never resolves if every controller is dropped without aborting.
    pub async fn aborted(&mut self) {
        if self.rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
