//! In-memory implementation of the `EventStoreRepository` trait.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use catalog_core::clock::{Clock, SystemClock};
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::repository::EventStoreRepository;

/// Thread-safe in-memory event store, suitable for unit tests and local
/// development.
///
/// Events are held in insertion order, which stands in for the arrival order
/// a durable store would record. Queries that sort by `occurred_on` break
/// timestamp ties by that insertion order.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<DomainEvent>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryEventStore {
    /// Creates an empty store that stamps publications with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that stamps publications with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStoreRepository for InMemoryEventStore {
    async fn load_history(
        &self,
        aggregate_id: Uuid,
        aggregate_type: &str,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let events = self.events.read().expect("event store lock poisoned");
        let mut history: Vec<DomainEvent> = events
            .iter()
            .filter(|e| e.aggregate_id() == aggregate_id && e.aggregate_type() == aggregate_type)
            .cloned()
            .collect();
        history.sort_by_key(DomainEvent::occurred_on);
        Ok(history)
    }

    async fn append_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        let mut stored = self.events.write().expect("event store lock poisoned");
        // Reject the whole batch before touching the log, so a duplicate id
        // never leaves a partial append behind.
        let mut seen: HashSet<Uuid> = stored.iter().map(DomainEvent::event_id).collect();
        for event in events {
            if !seen.insert(event.event_id()) {
                return Err(DomainError::Infrastructure(format!(
                    "duplicate event id: {}",
                    event.event_id()
                )));
            }
        }
        stored.extend_from_slice(events);
        Ok(())
    }

    async fn find_pending_events(&self) -> Result<Vec<DomainEvent>, DomainError> {
        let events = self.events.read().expect("event store lock poisoned");
        let mut pending: Vec<DomainEvent> = events
            .iter()
            .filter(|e| !e.is_published())
            .cloned()
            .collect();
        pending.sort_by_key(DomainEvent::occurred_on);
        Ok(pending)
    }

    async fn mark_as_published(&self, event: &DomainEvent) -> Result<(), DomainError> {
        let mut events = self.events.write().expect("event store lock poisoned");
        let stamp = event.published_at().unwrap_or_else(|| self.clock.now());
        for stored in events.iter_mut() {
            if stored.event_id() == event.event_id() {
                stored.mark_published(stamp);
            }
        }
        Ok(())
    }
}
