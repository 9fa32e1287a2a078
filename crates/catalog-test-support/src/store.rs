//! Mock `EventStoreRepository` implementations for tests.

use async_trait::async_trait;
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;
use catalog_core::repository::EventStoreRepository;
use uuid::Uuid;

/// An event store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventStore;

#[async_trait]
impl EventStoreRepository for FailingEventStore {
    async fn load_history(
        &self,
        _aggregate_id: Uuid,
        _aggregate_type: &str,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(&self, _events: &[DomainEvent]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_pending_events(&self) -> Result<Vec<DomainEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn mark_as_published(&self, _event: &DomainEvent) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
