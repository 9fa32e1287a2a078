//! Event store abstractions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::event::DomainEvent;

/// Object-safe persistence contract for the append-only event log.
///
/// Implementations serialize concurrent appends; callers rely on
/// [`append_events`](EventStoreRepository::append_events) being atomic.
#[async_trait]
pub trait EventStoreRepository: Send + Sync {
    /// Loads the full history for one aggregate key, ordered ascending by
    /// `occurred_on` with ties broken by insertion order.
    ///
    /// An unknown key yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Infrastructure`] when the query cannot
    /// complete.
    async fn load_history(
        &self,
        aggregate_id: Uuid,
        aggregate_type: &str,
    ) -> Result<Vec<DomainEvent>, DomainError>;

    /// Appends every event in `events`, in order, atomically: either all of
    /// them become durable or none do.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Infrastructure`] when the append cannot
    /// complete; no partial batch is observable afterwards.
    async fn append_events(&self, events: &[DomainEvent]) -> Result<(), DomainError>;

    /// Returns every unpublished event across all aggregates, ordered
    /// ascending by `occurred_on` with ties broken by insertion order,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Infrastructure`] when the query cannot
    /// complete.
    async fn find_pending_events(&self) -> Result<Vec<DomainEvent>, DomainError>;

    /// Durably stamps the stored event as published. Marking an
    /// already-published event again is a no-op, and an unknown event id is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Infrastructure`] when the update cannot
    /// complete.
    async fn mark_as_published(&self, event: &DomainEvent) -> Result<(), DomainError>;
}

/// Aggregate-level operations available on any [`EventStoreRepository`].
#[async_trait]
pub trait EventStore: EventStoreRepository {
    /// Loads and folds the aggregate with the given id, or `None` when no
    /// events exist for it.
    ///
    /// # Errors
    ///
    /// Propagates load failures and reconstruction errors.
    async fn find<A>(&self, aggregate_id: Uuid) -> Result<Option<A>, DomainError>
    where
        A: Aggregate + Send,
    {
        let history = self.load_history(aggregate_id, A::AGGREGATE_TYPE).await?;
        if history.is_empty() {
            return Ok(None);
        }
        A::reconstruct(history).map(Some)
    }

    /// Atomically appends the aggregate's buffered events in buffered order,
    /// then clears the buffer. The buffer survives untouched when the append
    /// fails, so the command can be retried or rolled back whole.
    ///
    /// # Errors
    ///
    /// Propagates append failures.
    async fn store<A>(&self, aggregate: &mut A) -> Result<(), DomainError>
    where
        A: Aggregate + Send,
    {
        if aggregate.uncommitted_events().is_empty() {
            return Ok(());
        }
        self.append_events(aggregate.uncommitted_events()).await?;
        aggregate.clear_uncommitted_events();
        Ok(())
    }
}

impl<R: EventStoreRepository + ?Sized> EventStore for R {}
