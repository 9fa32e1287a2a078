//! Event store implementations for the book catalog service.

pub mod memory_event_store;
pub mod pg_event_store;
