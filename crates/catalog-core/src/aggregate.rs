//! Aggregate abstractions.

use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Ordered buffer of events produced since the last flush.
///
/// Concrete aggregates own one of these instead of inheriting buffering
/// behavior. The repository drains the buffer after a successful append,
/// never before, so several mutations can land in the log as one atomic
/// batch.
#[derive(Debug, Default)]
pub struct UncommittedEvents {
    events: Vec<DomainEvent>,
}

impl UncommittedEvents {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event to the buffer; does not persist it.
    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Returns the buffered events in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Trait for aggregates whose state is the fold of their event history.
pub trait Aggregate: Sized {
    /// Logical type name scoping this aggregate's slice of the event log.
    const AGGREGATE_TYPE: &'static str;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns uncommitted events in insertion order.
    fn uncommitted_events(&self) -> &[DomainEvent];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);

    /// Folds a complete, ordered event history back into an aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyHistory`] for an empty sequence and
    /// [`DomainError::MalformedEvent`] when the sequence cannot be folded.
    fn reconstruct(history: Vec<DomainEvent>) -> Result<Self, DomainError>;
}
