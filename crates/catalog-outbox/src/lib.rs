//! Polling outbox relay for the book catalog service.

pub mod pending_events_publisher;
