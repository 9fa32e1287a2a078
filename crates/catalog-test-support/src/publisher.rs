//! Controllable `DomainEventPublisher` implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::publisher::DomainEventPublisher;
use uuid::Uuid;

/// A publisher that records every delivery attempt and succeeds unless the
/// event id has been marked to fail.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    attempted: Mutex<Vec<Uuid>>,
    published: Mutex<Vec<DomainEvent>>,
    failing: Mutex<HashSet<Uuid>>,
}

impl RecordingEventPublisher {
    /// Create a publisher that accepts every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish of `event_id` fail until failures are cleared.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_event(&self, event_id: Uuid) {
        self.failing.lock().unwrap().insert(event_id);
    }

    /// Let previously failing events through again.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Returns every event id handed to `publish`, failed attempts included,
    /// in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn attempted_event_ids(&self) -> Vec<Uuid> {
        self.attempted.lock().unwrap().clone()
    }

    /// Returns a snapshot of the successfully published events in delivery
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_events(&self) -> Vec<DomainEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl DomainEventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), DomainError> {
        self.attempted.lock().unwrap().push(event.event_id());
        if self.failing.lock().unwrap().contains(&event.event_id()) {
            return Err(DomainError::Publish("transport unavailable".into()));
        }
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}
