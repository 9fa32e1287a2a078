//! Topic-based event bus backed by `tokio::sync::broadcast` channels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::publisher::{DomainEventPublisher, DomainEventSubscriber, SubscriberCallback};

/// Buffered events per topic before slow subscribers start lagging.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// In-process pub/sub bus that fans events out to every subscriber of a
/// topic.
///
/// Delivery is at-most-once per subscriber: a subscriber that falls more
/// than the channel capacity behind skips the missed events.
pub struct EventBus {
    channels: Mutex<HashMap<String, broadcast::Sender<DomainEvent>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a bus with the default per-topic buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per topic.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Returns the sender for `topic`, creating the channel on first use.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    fn sender(&self, topic: &str) -> broadcast::Sender<DomainEvent> {
        let mut channels = self.channels.lock().expect("event bus lock poisoned");
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainEventSubscriber for EventBus {
    async fn subscribe(&self, topic: &str, handler: SubscriberCallback) -> Result<(), DomainError> {
        let mut receiver = self.sender(topic).subscribe();
        let topic = topic.to_string();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(topic, skipped, "subscriber lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(())
    }
}

/// Publishes domain events to a single topic on an [`EventBus`].
pub struct EventBusPublisher {
    bus: Arc<EventBus>,
    topic: String,
}

impl EventBusPublisher {
    /// Creates a publisher that emits on `topic`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl DomainEventPublisher for EventBusPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError> {
        // A send error only means no subscriber is currently connected.
        let _ = self.bus.sender(&self.topic).send(event.clone());
        Ok(())
    }
}
