//! Graceful shutdown coordination
//!
//! A cloneable handle over the server's shutdown channel. Flipping it asks
//! the carrier to stop accepting traffic; the run loop then drives the rest
//! of the teardown sequence (state machine, session reaper, registries).

use tokio::sync::watch;

/// Handle for triggering graceful server shutdown.
///
/// Cloneable and thread-safe so signal handlers, health checks, and tests
/// can all coordinate the same shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub(crate) fn new(tx: watch::Sender<bool>) -> Self {
        Self { tx }
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether shutdown has been initiated
    pub fn is_shutting_down(&self) -> bool {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipping_the_handle_is_observable() {
        let (tx, rx) = watch::channel(false);
        let handle = ShutdownHandle::new(tx);
        assert!(!handle.is_shutting_down());
        handle.shutdown();
        assert!(handle.is_shutting_down());
        assert!(*rx.borrow());
    }
}
