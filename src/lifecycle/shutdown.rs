//! Graceful-stop signalling.
//!
//! One broadcast channel fans the stop request out to everything with a
//! subscription. The server loop holds a receiver and drains in-flight
//! requests when it fires; `trigger` is how an owner (main, a test
//! harness) asks the process to wind down without killing it.

use tokio::sync::broadcast;

/// Owner side of the stop signal. Hand out receivers with [`subscribe`],
/// fire the signal with [`trigger`].
///
/// [`subscribe`]: Shutdown::subscribe
/// [`trigger`]: Shutdown::trigger
pub struct Shutdown {
    signal: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (signal, _) = broadcast::channel(1);
        Self { signal }
    }

    /// Receiver for a task that should stop when the signal fires.
    /// Subscribe before spawning the task; a receiver obtained after
    /// `trigger` never sees the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.signal.subscribe()
    }

    /// Fire the stop signal. Safe to call with no subscribers and safe
    /// to call more than once.
    pub fn trigger(&self) {
        let _ = self.signal.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = shutdown.subscribe();

        shutdown.trigger();

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers_is_a_no_op() {
        Shutdown::new().trigger();
    }
}
