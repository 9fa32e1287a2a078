//! The domain event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::clock::Clock;

/// An immutable record of a single state change.
///
/// Events come into being through [`DomainEvent::create`] when an aggregate
/// mutates, are persisted by an event store, and are rehydrated verbatim with
/// [`DomainEvent::reconstruct`]. The only field that ever changes after
/// creation is `published_at`, which transitions once from `None` to `Some`
/// when the outbox delivers the event to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event identifier, never reused.
    event_id: Uuid,
    /// Aggregate instance this event belongs to.
    aggregate_id: Uuid,
    /// Logical type name of the owning aggregate.
    aggregate_type: String,
    /// Discriminator naming the kind of change.
    event_type: String,
    /// Payload; schema is determined by `event_type`.
    event_body: Value,
    /// Timestamp assigned at creation; orders one aggregate's history.
    occurred_on: DateTime<Utc>,
    /// Delivery timestamp; `None` until the event reaches the transport.
    published_at: Option<DateTime<Utc>>,
}

impl DomainEvent {
    /// Creates a new unpublished event with a fresh identifier.
    ///
    /// The payload is not validated here; producing a well-formed body is the
    /// concrete aggregate's responsibility.
    #[must_use]
    pub fn create(
        aggregate_id: Uuid,
        aggregate_type: impl Into<String>,
        event_type: impl Into<String>,
        event_body: Value,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event_type.into(),
            event_body,
            occurred_on: clock.now(),
            published_at: None,
        }
    }

    /// Rehydrates a previously persisted event. Only event stores should
    /// call this.
    #[must_use]
    pub fn reconstruct(
        event_id: Uuid,
        aggregate_id: Uuid,
        aggregate_type: impl Into<String>,
        event_type: impl Into<String>,
        event_body: Value,
        occurred_on: DateTime<Utc>,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event_type.into(),
            event_body,
            occurred_on,
            published_at,
        }
    }

    /// Stamps the event as delivered. A second call is a no-op; the first
    /// stamp wins.
    pub fn mark_published(&mut self, published_at: DateTime<Utc>) {
        if self.published_at.is_none() {
            self.published_at = Some(published_at);
        }
    }

    /// Returns the unique event identifier.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Returns the owning aggregate's identifier.
    #[must_use]
    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    /// Returns the owning aggregate's logical type name.
    #[must_use]
    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    /// Returns the discriminator naming the kind of change.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the payload.
    #[must_use]
    pub fn event_body(&self) -> &Value {
        &self.event_body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }

    /// Returns the delivery timestamp, if any.
    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Returns `true` once the event has been delivered at least once.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}
