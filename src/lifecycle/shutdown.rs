//! Stop signal shared by the serve loop and the externally managed standby.

use tokio::sync::broadcast;

use crate::lifecycle::signals::shutdown_signal;

/// One-shot stop broadcast.
///
/// [`GatewayServer::run`](crate::http::GatewayServer::run) takes a receiver
/// from [`Shutdown::subscribe`]; whoever owns the `Shutdown` decides when the
/// gateway stops.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscriber. A trigger with no subscribers is a no-op.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no gateway listening");
        }
    }

    /// Trigger on Ctrl+C or SIGTERM from a background task.
    pub fn trigger_on_signal(self) {
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("Stop signal received");
            self.trigger();
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
