//! Cooperative shutdown signal shared by every spawned task.

use tokio::sync::watch;

/// Broadcasts a one-shot "shut down now" signal to every subscriber.
///
/// Cloning a [`Notifier`] and handing a [`ShutdownRecv`] to each spawned task
/// coordinates graceful shutdown without a central supervisor reaching into
/// task internals.
#[derive(Clone)]
pub struct Notifier {
    tx: watch::Sender<bool>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Signal every subscriber that the process is shutting down.
    pub fn notify(&self) {
        let _ = self.tx.send(true);
    }

    pub fn subscribe(&self) -> ShutdownRecv {
        ShutdownRecv(self.tx.subscribe())
    }
}

/// A task's handle to the shutdown signal.
pub struct ShutdownRecv(watch::Receiver<bool>);

impl ShutdownRecv {
    /// Resolves once `Notifier::notify` has been called.
    ///
    /// Safe to call repeatedly or to select! against in a loop.
    pub async fn recv(&mut self) {
        // `changed()` only errors if every Notifier was dropped, which this
        // process treats the same as an explicit shutdown.
        let _ = self.0.changed().await;
    }

    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }
}

impl Clone for ShutdownRecv {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
