//! Pub/sub boundary for delivering domain events to external consumers.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Callback invoked with each event delivered to a subscription.
///
/// Delivery is at least once; handlers deduplicate by `event_id`.
pub type SubscriberCallback = Box<dyn Fn(DomainEvent) + Send + 'static>;

/// Outbound half of the transport: hands one event to the message fabric.
#[async_trait]
pub trait DomainEventPublisher: Send + Sync {
    /// Publishes a single event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Publish`] when the transport is unavailable or
    /// rejects the event.
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError>;
}

/// Inbound half of the transport: routes a topic's events to a handler.
#[async_trait]
pub trait DomainEventSubscriber: Send + Sync {
    /// Registers `handler` for every event subsequently published on
    /// `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Publish`] when the subscription cannot be
    /// established.
    async fn subscribe(
        &self,
        topic: &str,
        handler: SubscriberCallback,
    ) -> Result<(), DomainError>;
}
