//! Graceful stop for the broker service.
//!
//! `main` and the integration tests own one `Shutdown`; each `HttpServer::run`
//! holds a receiver and drains in-flight requests once it fires.

use tokio::sync::broadcast;

#[derive(Debug)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    /// Receiver to hand to a server before it starts.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Ask every subscribed server to stop. Firing with no servers left is a no-op.
    pub fn trigger(&self) {
        if self.notify.send(()).is_err() {
            tracing::debug!("Shutdown requested with no running servers");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
