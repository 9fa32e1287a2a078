//! Shared test mocks and utilities for the book catalog service.

mod clock;
mod publisher;
mod store;

pub use clock::{FixedClock, TickingClock};
pub use publisher::RecordingEventPublisher;
pub use store::FailingEventStore;
