//! Coarse state-changed fan-out.
//!
//! One process-wide channel carries a payload-free signal; observers
//! refetch authoritative state when it fires. Delivery is fire-and-forget:
//! a send with no observers, or to a lagging observer, is not an error.

use tokio::sync::broadcast;

/// The single event name pushed to connected observers.
pub const STATE_CHANGED_EVENT: &str = "assets:updated";

/// Fan-out sink for booking state changes.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<()>,
}

impl Broadcaster {
    /// `capacity` bounds the number of undelivered signals per observer;
    /// overflow drops the oldest, which is harmless since observers refetch
    /// everything anyway.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every observer that booking state changed.
    pub fn notify(&self) {
        let _ = self.tx.send(());
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_reaches_subscriber() {
        let broadcaster = Broadcaster::new(8);
        let mut observer = broadcaster.subscribe();
        broadcaster.notify();
        assert!(observer.recv().await.is_ok());
    }

    #[tokio::test]
    async fn notify_without_observers_is_silent() {
        let broadcaster = Broadcaster::new(8);
        broadcaster.notify();
        assert_eq!(broadcaster.observer_count(), 0);
    }

    #[tokio::test]
    async fn every_observer_sees_the_signal() {
        let broadcaster = Broadcaster::new(8);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();
        broadcaster.notify();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
