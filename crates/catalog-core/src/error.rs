//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Reconstruction was invoked with zero events.
    #[error("cannot reconstruct an aggregate from an empty event history")]
    EmptyHistory,

    /// Replay met an event that cannot be folded.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// The transport refused or failed to deliver an event.
    #[error("publish error: {0}")]
    Publish(String),
}
