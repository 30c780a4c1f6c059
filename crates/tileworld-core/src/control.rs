//! Cooperative shutdown.
//!
//! The runner holds the [`ShutdownSignal`]; every actor and the executor
//! hold a [`ShutdownListener`] and check it only at their suspension points,
//! so no operation is interrupted mid-application.

use tokio::sync::watch;

/// Sender side of the stop flag.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A listener observing this signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Ask every listener to stop at its next suspension point.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`trigger`](Self::trigger) has been called.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of the stop flag.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested.
    ///
    /// A dropped [`ShutdownSignal`] counts as a shutdown request.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn listener_wakes_on_trigger() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.subscribe();
        assert!(!listener.is_triggered());

        let waiter = tokio::spawn(async move {
            listener.wait().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        signal.trigger();
        assert!(waiter.await.is_ok());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn late_subscriber_sees_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        let mut listener = signal.subscribe();
        assert!(listener.is_triggered());
        listener.wait().await;
    }

    #[tokio::test]
    async fn dropped_signal_releases_waiters() {
        let signal = ShutdownSignal::new();
        let mut listener = signal.subscribe();
        drop(signal);
        listener.wait().await;
    }
}
