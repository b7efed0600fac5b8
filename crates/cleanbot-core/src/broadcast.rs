//! Fan-out of robot events to every live subscriber.
//!
//! Each subscriber gets its own bounded queue. [`Broadcaster::publish`]
//! never waits: it offers the event to every queue with `try_send`, and a
//! subscriber whose queue is full (too slow) or whose receiver is gone
//! (disconnected) is evicted on the spot. One bad subscriber therefore
//! never delays delivery to the others, and publishing never fails.
//!
//! Ordering across subscribers comes from the caller: the controller
//! publishes while holding the state lock, so every queue receives the
//! events in the same order.

use std::collections::BTreeMap;

use cleanbot_types::{RobotEvent, SubscriberId};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Errors returned by [`Broadcaster::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// The broadcaster is shutting down and refuses new subscribers.
    #[error("broadcaster is closed to new subscribers")]
    Closed,
}

/// One live subscription.
///
/// Dropping it disconnects the subscriber; the broadcaster notices on the
/// next publish and evicts the slot.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<RobotEvent>,
}

impl Subscription {
    /// This subscriber's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the subscriber has been evicted or the
    /// broadcaster closed, after any queued events have been drained.
    pub async fn recv(&mut self) -> Option<RobotEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<RobotEvent> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, Default)]
struct Registry {
    subscribers: BTreeMap<SubscriberId, mpsc::Sender<RobotEvent>>,
    closed: bool,
}

/// The live subscriber set.
#[derive(Debug)]
pub struct Broadcaster {
    registry: Mutex<Registry>,
    buffer: usize,
}

impl Broadcaster {
    /// Create a broadcaster whose subscribers may queue up to `buffer`
    /// undelivered events (at least 1).
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            buffer: buffer.max(1),
        }
    }

    /// Register a subscriber and queue `initial` as its first event.
    ///
    /// The caller supplies the send-on-connect snapshot so it can be taken
    /// under the same lock that orders all later publishes.
    pub fn subscribe(&self, initial: RobotEvent) -> Result<Subscription, BroadcastError> {
        let mut registry = self.registry.lock();
        if registry.closed {
            return Err(BroadcastError::Closed);
        }

        let (tx, rx) = mpsc::channel(self.buffer);
        // The queue is empty and has capacity >= 1.
        let _ = tx.try_send(initial);

        let id = SubscriberId::new();
        registry.subscribers.insert(id, tx);
        debug!(
            subscriber_id = %id,
            subscribers = registry.subscribers.len(),
            "Subscriber connected"
        );
        Ok(Subscription { id, rx })
    }

    /// Remove a subscriber. Unknown or already-removed ids are ignored.
    ///
    /// Returns whether a subscriber was removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.registry.lock().subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber_id = %id, "Subscriber removed");
        }
        removed
    }

    /// Offer `event` to every subscriber, evicting any that cannot take it.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn publish(&self, event: &RobotEvent) -> usize {
        let mut registry = self.registry.lock();
        let mut delivered: usize = 0;

        registry
            .subscribers
            .retain(|id, tx| match tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered = delivered.saturating_add(1);
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber_id = %id, "Subscriber queue full, evicting");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber_id = %id, "Subscriber gone, evicting");
                    false
                }
            });

        delivered
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    /// Refuse new subscribers and drop every queue.
    ///
    /// Existing subscribers still receive what was already queued, then
    /// see the end of their stream.
    pub fn close(&self) {
        let mut registry = self.registry.lock();
        registry.closed = true;
        let dropped = registry.subscribers.len();
        registry.subscribers.clear();
        debug!(dropped, "Broadcaster closed");
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.registry.lock().closed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cleanbot_types::RobotStateSnapshot;

    use super::*;

    fn status(progress: u8) -> RobotEvent {
        RobotEvent::StatusUpdate {
            state: RobotStateSnapshot {
                progress,
                ..RobotStateSnapshot::default()
            },
        }
    }

    #[test]
    fn subscribe_queues_initial_event_first() {
        let broadcaster = Broadcaster::new(4);
        let mut sub = broadcaster.subscribe(status(7)).unwrap();
        broadcaster.publish(&status(8));
        assert_eq!(sub.try_recv(), Some(status(7)));
        assert_eq!(sub.try_recv(), Some(status(8)));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn every_subscriber_sees_same_order() {
        let broadcaster = Broadcaster::new(16);
        let mut a = broadcaster.subscribe(status(0)).unwrap();
        let mut b = broadcaster.subscribe(status(0)).unwrap();
        for p in 1..=5 {
            assert_eq!(broadcaster.publish(&status(p)), 2);
        }
        let seen_a: Vec<_> = std::iter::from_fn(|| a.try_recv()).collect();
        let seen_b: Vec<_> = std::iter::from_fn(|| b.try_recv()).collect();
        assert_eq!(seen_a.len(), 6);
        assert_eq!(seen_a, seen_b);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let broadcaster = Broadcaster::new(4);
        let sub = broadcaster.subscribe(status(0)).unwrap();
        assert!(broadcaster.unsubscribe(sub.id()));
        assert!(!broadcaster.unsubscribe(sub.id()));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn dropped_subscriber_is_evicted_without_affecting_others() {
        let broadcaster = Broadcaster::new(4);
        let gone = broadcaster.subscribe(status(0)).unwrap();
        let mut alive = broadcaster.subscribe(status(0)).unwrap();
        drop(gone);

        assert_eq!(broadcaster.publish(&status(1)), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(alive.try_recv(), Some(status(0)));
        assert_eq!(alive.try_recv(), Some(status(1)));
    }

    #[test]
    fn slow_subscriber_is_evicted() {
        let broadcaster = Broadcaster::new(2);
        let mut slow = broadcaster.subscribe(status(0)).unwrap();
        let mut fast = broadcaster.subscribe(status(0)).unwrap();

        // Queue of 2 already holds the initial snapshot.
        assert_eq!(broadcaster.publish(&status(1)), 2);
        fast.try_recv();
        fast.try_recv();
        assert_eq!(broadcaster.publish(&status(2)), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);

        // The slow subscriber keeps what was queued, then its stream ends.
        assert_eq!(slow.try_recv(), Some(status(0)));
        assert_eq!(slow.try_recv(), Some(status(1)));
        assert_eq!(slow.try_recv(), None);
        assert_eq!(fast.try_recv(), Some(status(2)));
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let broadcaster = Broadcaster::new(4);
        assert_eq!(broadcaster.publish(&status(1)), 0);
    }

    #[tokio::test]
    async fn close_refuses_new_and_ends_streams() {
        let broadcaster = Broadcaster::new(4);
        let mut sub = broadcaster.subscribe(status(3)).unwrap();
        broadcaster.close();
        assert!(broadcaster.is_closed());
        assert_eq!(
            broadcaster.subscribe(status(0)).err(),
            Some(BroadcastError::Closed)
        );
        assert_eq!(sub.recv().await, Some(status(3)));
        assert_eq!(sub.recv().await, None);
    }
}
