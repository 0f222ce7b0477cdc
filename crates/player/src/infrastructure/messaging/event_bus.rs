//! Event Bus for fanning socket events out to subscribers.
//!
//! Push-based: subscribers register callbacks that are invoked, in registration
//! order, for every dispatched event. The bridge uses one bus for inbound
//! server events and one for outbound client events.

use std::sync::Arc;

use tokio::sync::Mutex;

type Subscriber<E> = Box<dyn FnMut(E) + Send + 'static>;

/// Event bus for socket events.
///
/// The bus holds strong references to subscribers, so they persist until
/// the last clone of the bus is dropped.
pub struct EventBus<E> {
    subscribers: Arc<Mutex<Vec<Subscriber<E>>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to all events.
    pub async fn subscribe(&self, callback: impl FnMut(E) + Send + 'static) {
        self.subscribers.lock().await.push(Box::new(callback));
    }

    /// Dispatch an event to all subscribers.
    ///
    /// Each subscriber gets its own clone of the event. Holding the lock for
    /// the whole fan-out keeps consecutive dispatches in order.
    pub async fn dispatch(&self, event: E) {
        let mut subscribers = self.subscribers.lock().await;
        for subscriber in subscribers.iter_mut() {
            subscriber(event.clone());
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use codepics_shared::{HostUpdate, ServerMessage};

    use super::*;

    fn host_event(is_host: bool) -> ServerMessage {
        ServerMessage::WhoIsHost(HostUpdate { is_host })
    }

    #[tokio::test]
    async fn test_subscribe_and_dispatch() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU32::new(0));

        let count_clone = Arc::clone(&count);
        bus.subscribe(move |_event: ServerMessage| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(bus.subscriber_count().await, 1);

        bus.dispatch(host_event(true)).await;
        bus.dispatch(host_event(false)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribers_run_in_registration_order() {
        let bus = EventBus::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        for tag in ["logger", "handler"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event: ServerMessage| {
                if let Ok(mut seen) = seen.lock() {
                    seen.push(format!("{tag}:{}", event.event_name()));
                }
            })
            .await;
        }

        bus.dispatch(host_event(true)).await;

        let seen = seen.lock().expect("lock").clone();
        assert_eq!(seen, vec!["logger:who_is_host", "handler:who_is_host"]);
    }
}
