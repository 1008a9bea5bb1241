//! Subscription fan-out for scheduler and configuration events.
//!
//! One publisher broadcasts to many independent subscribers. Each subscriber
//! owns a removable [`Subscription`] handle released explicitly via
//! [`Subscription::detach`] (or implicitly on drop), so the publisher never
//! holds indefinite references to its consumers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type Registry<T> = Mutex<HashMap<u64, UnboundedSender<T>>>;

/// Broadcast channel fanning one event out to every live subscriber.
pub struct Publisher<T> {
    subscribers: Arc<Registry<T>>,
    next_id: AtomicU64,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T> {
    /// Create a publisher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber and hand back its owning handle.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, tx);
        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T: Clone> Publisher<T> {
    /// Deliver an event to every subscriber, dropping any whose receiver has
    /// gone away without detaching.
    pub fn publish(&self, event: T) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|_, tx| tx.send(event.clone()).is_ok());
    }
}

/// A subscriber's owning handle onto a [`Publisher`].
///
/// Dropping the handle deregisters the subscriber; [`Subscription::detach`]
/// does so explicitly for teardown paths that want the removal to be visible.
pub struct Subscription<T> {
    id: u64,
    rx: UnboundedReceiver<T>,
    registry: Weak<Registry<T>>,
}

impl<T> Subscription<T> {
    /// Receive the next event, or `None` once detached and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receive an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Deregister from the publisher. Events already delivered remain
    /// readable; no further events arrive.
    pub fn detach(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(&self.id);
        }
        self.registry = Weak::new();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_to_all_subscribers() {
        let publisher = Publisher::new();
        let mut a = publisher.subscribe();
        let mut b = publisher.subscribe();

        publisher.publish(7_u32);

        assert_eq!(a.try_recv(), Some(7));
        assert_eq!(b.try_recv(), Some(7));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_detach_removes_subscriber() {
        let publisher = Publisher::new();
        let mut a = publisher.subscribe();
        let _b = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        a.detach();
        assert_eq!(publisher.subscriber_count(), 1);

        publisher.publish("late");
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_drop_removes_subscriber() {
        let publisher = Publisher::<u32>::new();
        {
            let _sub = publisher.subscribe();
            assert_eq!(publisher.subscriber_count(), 1);
        }
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_async_recv() {
        let publisher = Publisher::new();
        let mut sub = publisher.subscribe();
        publisher.publish(1_u32);
        publisher.publish(2_u32);
        assert_eq!(sub.recv().await, Some(1));
        assert_eq!(sub.recv().await, Some(2));
    }
}
