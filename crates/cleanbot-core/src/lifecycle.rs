//! Process-wide shutdown signal shared by the clock and the HTTP server.
//!
//! All fields are lock-free so the tick loop and request handlers can
//! check the flag on their hot path.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shutdown coordination.
#[derive(Debug, Default)]
pub struct Lifecycle {
    /// Whether a shutdown has been requested.
    shutting_down: AtomicBool,

    /// Wakes every task waiting in [`wait_for_shutdown`](Self::wait_for_shutdown).
    shutdown_notify: Notify,
}

impl Lifecycle {
    /// A lifecycle that is running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task to wind down. Idempotent.
    pub fn request_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        self.shutdown_notify.notify_waiters();
    }

    /// Check whether a shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Wait until a shutdown is requested.
    ///
    /// Returns immediately if one already was.
    pub async fn wait_for_shutdown(&self) {
        loop {
            // Register before checking so a request in between is not lost.
            let notified = self.shutdown_notify.notified();
            if self.is_shutting_down() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn wait_returns_after_request() {
        let lifecycle = Arc::new(Lifecycle::new());
        let waiter = {
            let lifecycle = Arc::clone(&lifecycle);
            tokio::spawn(async move { lifecycle.wait_for_shutdown().await })
        };
        tokio::task::yield_now().await;
        assert!(!lifecycle.is_shutting_down());

        lifecycle.request_shutdown();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn wait_after_request_is_immediate() {
        let lifecycle = Lifecycle::new();
        lifecycle.request_shutdown();
        lifecycle.request_shutdown();
        assert!(lifecycle.is_shutting_down());
        lifecycle.wait_for_shutdown().await;
    }
}
