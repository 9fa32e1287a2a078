//! In-process event transport for the book catalog service.

pub mod event_bus;
